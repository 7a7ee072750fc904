//! Resume text extraction.
//!
//! Dispatches on the declared format and walks a per-format fallback chain:
//! PDF text layer → per-page OCR → whole-document OCR; DOCX structured reader →
//! raw XML → external converter; plain text with encoding detection.
//!
//! Extraction is blocking (subprocesses, PDF parsing). Async callers must run it
//! inside `tokio::task::spawn_blocking`.

pub mod normalize;
pub mod ocr;
pub mod opendoc;
pub mod pdf;
pub mod rtf;
pub mod scratch;
pub mod text;
pub mod types;
pub mod word;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

pub use normalize::normalize_text;
pub use scratch::ScratchDir;
pub use types::{
    DocumentConverter, ExtractedText, ExtractionMethod, OcrEngine, PageRenderer, PdfTextSource,
    ResumeDocument, ResumeFormat, SUPPORTED_EXTENSIONS,
};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("DOCX reader failed: {0}")]
    Docx(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Converter failed: {0}")]
    Converter(String),

    #[error("All extraction strategies failed for {file}: {reasons}")]
    AllStrategiesFailed { file: String, reasons: String },

    #[error("No text could be extracted from {0}")]
    NoText(String),
}

/// Format-dispatching extractor. Built once at startup and shared via `AppState`.
pub struct TextExtractor {
    pdf: Box<dyn PdfTextSource>,
    renderer: Box<dyn PageRenderer>,
    ocr: Box<dyn OcrEngine>,
    converter: Box<dyn DocumentConverter>,
    scratch: Option<ScratchDir>,
}

impl TextExtractor {
    pub fn new(
        pdf: Box<dyn PdfTextSource>,
        renderer: Box<dyn PageRenderer>,
        ocr: Box<dyn OcrEngine>,
        converter: Box<dyn DocumentConverter>,
    ) -> Self {
        Self {
            pdf,
            renderer,
            ocr,
            converter,
            scratch: None,
        }
    }

    /// Production wiring: pdf-extract, pdftoppm, tesseract and antiword.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(pdf::PdfExtractText),
            Box::new(ocr::PdftoppmRenderer::new(&config.pdftoppm_bin, config.ocr_dpi)),
            Box::new(ocr::TesseractCli::new(&config.tesseract_bin)),
            Box::new(word::AntiwordConverter::new(&config.antiword_bin)),
        )
        .with_scratch_dir(config.scratch_dir.clone())
    }

    /// Enables the debug side file written after each successful extraction.
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch = Some(ScratchDir::new(dir));
        self
    }

    /// Extracts text from `bytes`, resolving the format from `file_name`.
    pub fn extract(&self, file_name: &str, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let format = ResumeFormat::from_file_name(file_name)?;
        self.extract_as(format, file_name, bytes)
    }

    /// Populates `document.extracted_text` on first call; later calls return the cached text.
    pub fn extract_document<'a>(
        &self,
        document: &'a mut ResumeDocument,
    ) -> Result<&'a str, ExtractionError> {
        if document.extracted_text.is_none() {
            let extracted = self.extract_as(document.format, &document.file_name, &document.bytes)?;
            document.extracted_text = Some(extracted.text);
        }
        Ok(document.extracted_text.as_deref().unwrap_or_default())
    }

    pub fn extract_as(
        &self,
        format: ResumeFormat,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ExtractedText, ExtractionError> {
        debug!("Extracting {file_name} as {format:?} ({} bytes)", bytes.len());

        let extracted = match format {
            ResumeFormat::Pdf => {
                pdf::extract_pdf(bytes, self.pdf.as_ref(), self.renderer.as_ref(), self.ocr.as_ref())?
            }
            ResumeFormat::Doc | ResumeFormat::Docx => {
                word::extract_word(bytes, format, file_name, self.converter.as_ref())?
            }
            ResumeFormat::Txt => {
                ExtractedText::new(text::decode_text(bytes).text, ExtractionMethod::PlainText)
            }
            ResumeFormat::Rtf => {
                let raw = text::decode_text(bytes).text;
                ExtractedText::new(rtf::rtf_to_text(&raw)?, ExtractionMethod::Rtf)
            }
            ResumeFormat::Odt => ExtractedText::new(opendoc::odt_text(bytes)?, ExtractionMethod::Odt),
            ResumeFormat::Jpeg | ResumeFormat::Png => ExtractedText {
                text: self.ocr.ocr_image(bytes)?,
                method: ExtractionMethod::ImageOcr,
                ocr_pages: 1,
            },
        };

        if extracted.text.trim().is_empty() {
            return Err(ExtractionError::NoText(file_name.to_string()));
        }

        info!(
            "Extracted {} chars from {file_name} via {:?}",
            extracted.text.len(),
            extracted.method
        );

        if let Some(scratch) = &self.scratch {
            scratch.write(file_name, &extracted.text);
        }

        Ok(extracted)
    }
}
