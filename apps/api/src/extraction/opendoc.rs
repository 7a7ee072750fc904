//! Zip-packaged XML documents (DOCX, ODT) read without a full XML parser.
//!
//! Used as the raw fallback for DOCX when the structured reader rejects the
//! package, and as the only reader for ODT.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ExtractionError;

static DOCX_INSTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:instrText[^>]*>.*?</w:instrText>").unwrap());
static DOCX_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:cr\s*/>").unwrap());
static DOCX_TAB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<w:tab\s*/>").unwrap());

static ODT_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</text:p>|</text:h>|<text:line-break\s*/>").unwrap());
static ODT_TAB: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<text:tab\s*/>").unwrap());
static ODT_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<text:s(?:\s+text:c="(\d+)")?\s*/>"#).unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:#x([0-9a-fA-F]+)|#(\d+)|(amp|lt|gt|quot|apos));").unwrap());

/// Reads one entry of a zip archive as UTF-8.
pub fn read_zip_entry(bytes: &[u8], entry: &str) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Archive(e.to_string()))?;
    let mut file = archive
        .by_name(entry)
        .map_err(|e| ExtractionError::Archive(format!("{entry}: {e}")))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Text of `word/document.xml`, one line per paragraph.
pub fn docx_xml_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_zip_entry(bytes, "word/document.xml")?;
    let xml = DOCX_INSTR.replace_all(&xml, "");
    let xml = DOCX_BREAK.replace_all(&xml, "\n");
    let xml = DOCX_TAB.replace_all(&xml, "\t");
    Ok(finish(&xml))
}

/// Text of an OpenDocument text file's `content.xml`.
pub fn odt_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let xml = read_zip_entry(bytes, "content.xml")?;
    let xml = ODT_BREAK.replace_all(&xml, "\n");
    let xml = ODT_TAB.replace_all(&xml, "\t");
    let xml = ODT_SPACES.replace_all(&xml, |caps: &Captures| {
        let count = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .unwrap_or(1);
        " ".repeat(count.min(64))
    });
    Ok(finish(&xml))
}

fn finish(xml: &str) -> String {
    let text = TAG.replace_all(xml, "");
    let text = unescape(&text);
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            if let Some(hex) = caps.get(1) {
                return u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default();
            }
            if let Some(dec) = caps.get(2) {
                return dec
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_default();
            }
            match caps.get(3).map(|m| m.as_str()) {
                Some("amp") => "&",
                Some("lt") => "<",
                Some("gt") => ">",
                Some("quot") => "\"",
                Some("apos") => "'",
                _ => "",
            }
            .to_string()
        })
        .into_owned()
}
