use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Resume formats accepted for upload, keyed by file extension.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "odt", "jpg", "jpeg", "png",
];

/// Declared format of a resume file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
    Txt,
    Rtf,
    Odt,
    Jpeg,
    Png,
}

impl ResumeFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            "rtf" => Some(Self::Rtf),
            "odt" => Some(Self::Odt),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Resolves the format from the extension of `file_name`.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(format!(".{ext}")))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Txt => "txt",
            Self::Rtf => "rtf",
            Self::Odt => "odt",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// A resume as uploaded: raw bytes plus declared format.
/// `extracted_text` is populated once by the extractor and never changed after.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub format: ResumeFormat,
    pub bytes: Vec<u8>,
    pub extracted_text: Option<String>,
}

impl ResumeDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ExtractionError> {
        let file_name = file_name.into();
        let format = ResumeFormat::from_file_name(&file_name)?;
        Ok(Self {
            file_name,
            format,
            bytes,
            extracted_text: None,
        })
    }
}

/// How the text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Every page had a usable text layer.
    PdfDirect,
    /// Text layer for most pages, OCR for the blank ones.
    PdfOcrFallback,
    /// Text layer unreadable; every page rasterised and OCR'd.
    PdfFullOcr,
    Docx,
    DocxXml,
    GenericConverter,
    PlainText,
    Rtf,
    Odt,
    ImageOcr,
}

/// Successful extraction. `text` is never empty or whitespace-only.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    /// Number of pages/images whose text came from OCR.
    pub ocr_pages: usize,
}

impl ExtractedText {
    pub(crate) fn new(text: String, method: ExtractionMethod) -> Self {
        Self {
            text,
            method,
            ocr_pages: 0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine seams (real implementations shell out; tests use mocks)
// ────────────────────────────────────────────────────────────────────────────

/// Direct text-layer extraction, one string per page.
pub trait PdfTextSource: Send + Sync {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;
}

/// Rasterises PDF pages to PNG for OCR. Page numbers are 1-based.
pub trait PageRenderer: Send + Sync {
    fn render_page(&self, pdf_bytes: &[u8], page_number: usize)
        -> Result<Vec<u8>, ExtractionError>;

    fn render_all(&self, pdf_bytes: &[u8]) -> Result<Vec<Vec<u8>>, ExtractionError>;
}

/// Optical character recognition over an encoded image (PNG/JPEG).
pub trait OcrEngine: Send + Sync {
    fn ocr_image(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Last-resort converter for formats the native readers cannot handle (legacy .doc).
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractionError>;
}
