//! External OCR and rasterisation tools.
//!
//! Both engines shell out (`tesseract`, `pdftoppm`) through temp files; the
//! binaries are configurable so deployments can point at non-PATH installs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::types::{OcrEngine, PageRenderer};
use super::ExtractionError;

/// Tesseract invoked as `tesseract <image> stdout -l <lang>`.
pub struct TesseractCli {
    bin: PathBuf,
    lang: String,
}

impl TesseractCli {
    pub fn new(bin: impl AsRef<Path>) -> Self {
        Self {
            bin: bin.as_ref().to_path_buf(),
            lang: "eng".to_string(),
        }
    }

    pub fn with_languages(mut self, langs: &str) -> Self {
        self.lang = langs.to_string();
        self
    }
}

impl OcrEngine for TesseractCli {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut image = tempfile::Builder::new()
            .prefix("ocr-")
            .suffix(".img")
            .tempfile()?;
        image.write_all(image_bytes)?;
        image.flush()?;

        let output = Command::new(&self.bin)
            .arg(image.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .map_err(|e| {
                ExtractionError::Ocr(format!("failed to run {}: {e}", self.bin.display()))
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Tesseract produced {} chars", text.len());
        Ok(text)
    }
}

/// Poppler's `pdftoppm`, rendering to PNG at a fixed DPI.
pub struct PdftoppmRenderer {
    bin: PathBuf,
    dpi: u32,
}

impl PdftoppmRenderer {
    pub fn new(bin: impl AsRef<Path>, dpi: u32) -> Self {
        Self {
            bin: bin.as_ref().to_path_buf(),
            dpi,
        }
    }

    fn run(&self, args: &[String], input: &Path, prefix: &Path) -> Result<(), ExtractionError> {
        let output = Command::new(&self.bin)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .args(args)
            .arg(input)
            .arg(prefix)
            .output()
            .map_err(|e| {
                ExtractionError::Render(format!("failed to run {}: {e}", self.bin.display()))
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Render(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_page(&self, pdf_bytes: &[u8], page_number: usize) -> Result<Vec<u8>, ExtractionError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        std::fs::write(&input, pdf_bytes)?;
        let prefix = dir.path().join("page");

        let page = page_number.to_string();
        self.run(
            &[
                "-f".to_string(),
                page.clone(),
                "-l".to_string(),
                page,
                "-singlefile".to_string(),
            ],
            &input,
            &prefix,
        )?;

        Ok(std::fs::read(prefix.with_extension("png"))?)
    }

    fn render_all(&self, pdf_bytes: &[u8]) -> Result<Vec<Vec<u8>>, ExtractionError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("input.pdf");
        std::fs::write(&input, pdf_bytes)?;

        self.run(&[], &input, &dir.path().join("page"))?;

        // pdftoppm zero-pads page numbers, so lexical order is page order.
        let mut images: Vec<PathBuf> = std::fs::read_dir(dir.path())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(ExtractionError::Render("no pages rendered".to_string()));
        }

        images
            .iter()
            .map(|p| std::fs::read(p).map_err(ExtractionError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tesseract_binary_is_an_ocr_error() {
        let engine = TesseractCli::new("/nonexistent/bin/tesseract");
        let err = engine.ocr_image(b"\x89PNG").unwrap_err();
        assert!(matches!(err, ExtractionError::Ocr(msg) if msg.contains("failed to run")));
    }

    #[test]
    fn test_missing_pdftoppm_binary_is_a_render_error() {
        let renderer = PdftoppmRenderer::new("/nonexistent/bin/pdftoppm", 300);
        assert!(matches!(
            renderer.render_page(b"%PDF-1.4", 1),
            Err(ExtractionError::Render(_))
        ));
        assert!(matches!(
            renderer.render_all(b"%PDF-1.4"),
            Err(ExtractionError::Render(_))
        ));
    }

    #[test]
    fn test_language_override() {
        let engine = TesseractCli::new("tesseract").with_languages("eng+fra");
        assert_eq!(engine.lang, "eng+fra");
    }
}
