use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::{debug, warn};

use super::opendoc;
use super::types::{DocumentConverter, ExtractedText, ExtractionMethod, ResumeFormat};
use super::ExtractionError;

/// Paragraph text via the docx-rs document model.
pub fn docx_structured_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            push_paragraph_children(&paragraph.children, &mut text);
            text.push('\n');
        }
    }
    Ok(text.trim().to_string())
}

fn push_paragraph_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, text),
            _ => {}
        }
    }
}

/// Word documents: structured reader, then raw XML, then the external converter.
/// A strategy that returns only whitespace counts as failed.
pub fn extract_word(
    bytes: &[u8],
    format: ResumeFormat,
    file_name: &str,
    converter: &dyn DocumentConverter,
) -> Result<ExtractedText, ExtractionError> {
    let mut reasons = Vec::new();

    let strategies: [(ExtractionMethod, &dyn Fn() -> Result<String, ExtractionError>); 3] = [
        (ExtractionMethod::Docx, &|| docx_structured_text(bytes)),
        (ExtractionMethod::DocxXml, &|| opendoc::docx_xml_text(bytes)),
        (ExtractionMethod::GenericConverter, &|| {
            converter.convert(bytes, format)
        }),
    ];

    for (method, strategy) in strategies {
        match strategy() {
            Ok(text) if !text.trim().is_empty() => {
                debug!("{file_name}: extracted via {method:?}");
                return Ok(ExtractedText::new(text, method));
            }
            Ok(_) => reasons.push(format!("{method:?}: empty text")),
            Err(e) => {
                warn!("{file_name}: {method:?} failed: {e}");
                reasons.push(format!("{method:?}: {e}"));
            }
        }
    }

    Err(ExtractionError::AllStrategiesFailed {
        file: file_name.to_string(),
        reasons: reasons.join("; "),
    })
}

/// Legacy binary `.doc` via `antiword <file>`.
pub struct AntiwordConverter {
    bin: PathBuf,
}

impl AntiwordConverter {
    pub fn new(bin: impl AsRef<Path>) -> Self {
        Self {
            bin: bin.as_ref().to_path_buf(),
        }
    }
}

impl DocumentConverter for AntiwordConverter {
    fn convert(&self, bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractionError> {
        let mut input = tempfile::Builder::new()
            .prefix("convert-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        input.write_all(bytes)?;
        input.flush()?;

        let output = Command::new(&self.bin)
            .arg(input.path())
            .output()
            .map_err(|e| {
                ExtractionError::Converter(format!("failed to run {}: {e}", self.bin.display()))
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Converter(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
