use tracing::{debug, warn};

use super::types::{ExtractedText, ExtractionMethod, OcrEngine, PageRenderer, PdfTextSource};
use super::ExtractionError;

/// Text-layer extraction via the pdf-extract crate.
pub struct PdfExtractText;

impl PdfTextSource for PdfExtractText {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        // pdf-extract panics on some malformed inputs; treat that like any parse error.
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ExtractionError::PdfParsing(e.to_string())),
            Err(_) => Err(ExtractionError::PdfParsing(
                "PDF parser aborted on malformed input".to_string(),
            )),
        }
    }
}

/// Extracts a PDF page by page.
///
/// - Pages with an empty or whitespace-only text layer are rendered and OCR'd.
/// - If the text layer cannot be read at all, partial output is discarded and
///   every page is OCR'd.
/// - A page whose OCR fails contributes nothing; the caller decides whether the
///   remaining text is enough.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    source: &dyn PdfTextSource,
    renderer: &dyn PageRenderer,
    ocr: &dyn OcrEngine,
) -> Result<ExtractedText, ExtractionError> {
    let pages = match source.page_texts(pdf_bytes) {
        Ok(pages) => pages,
        Err(e) => {
            warn!("Direct PDF extraction failed ({e}), falling back to full-document OCR");
            return ocr_all_pages(pdf_bytes, renderer, ocr);
        }
    };

    let mut texts = Vec::with_capacity(pages.len());
    let mut ocr_pages = 0;

    for (index, page_text) in pages.into_iter().enumerate() {
        if !page_text.trim().is_empty() {
            texts.push(page_text);
            continue;
        }

        let page_number = index + 1;
        debug!("Page {page_number} has no text layer, running OCR");
        match renderer
            .render_page(pdf_bytes, page_number)
            .and_then(|image| ocr.ocr_image(&image))
        {
            Ok(text) => {
                ocr_pages += 1;
                texts.push(text);
            }
            Err(e) => warn!("OCR fallback failed for page {page_number}: {e}"),
        }
    }

    let method = if ocr_pages > 0 {
        ExtractionMethod::PdfOcrFallback
    } else {
        ExtractionMethod::PdfDirect
    };

    Ok(ExtractedText {
        text: join_pages(&texts),
        method,
        ocr_pages,
    })
}

fn ocr_all_pages(
    pdf_bytes: &[u8],
    renderer: &dyn PageRenderer,
    ocr: &dyn OcrEngine,
) -> Result<ExtractedText, ExtractionError> {
    let images = renderer.render_all(pdf_bytes)?;

    let mut texts = Vec::with_capacity(images.len());
    for (index, image) in images.iter().enumerate() {
        match ocr.ocr_image(image) {
            Ok(text) => texts.push(text),
            Err(e) => warn!("OCR failed for page {}: {e}", index + 1),
        }
    }

    Ok(ExtractedText {
        text: join_pages(&texts),
        method: ExtractionMethod::PdfFullOcr,
        ocr_pages: texts.len(),
    })
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
