use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use tracing::{debug, warn};

/// Decoded text plus the name of the encoding that produced it.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decodes raw bytes of unknown encoding.
///
/// Order: byte-order mark, then statistical detection. If the detected encoding
/// still reports malformed sequences the bytes are re-read once as Latin-1,
/// which maps every byte to a code point and cannot fail.
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if !had_errors {
            return DecodedText {
                text: text.into_owned(),
                encoding: encoding.name(),
            };
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    if !had_errors {
        debug!("Decoded plain text as {}", encoding.name());
        return DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
        };
    }

    warn!(
        "Decoding as {} produced errors, retrying as Latin-1",
        encoding.name()
    );
    DecodedText {
        text: latin1(bytes),
        encoding: "ISO-8859-1",
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let decoded = decode_text("Zoë Ångström — Rust".as_bytes());
        assert_eq!(decoded.text, "Zoë Ångström — Rust");
        assert_eq!(decoded.encoding, "UTF-8");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Resume");
        assert_eq!(decode_text(&bytes).text, "Resume");
    }

    #[test]
    fn test_utf16le_bom_detected() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.text, "Hi");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn test_single_byte_encoding_detected() {
        // "Résumé de José" in windows-1252
        let bytes = b"R\xe9sum\xe9 de Jos\xe9, d\xe9veloppeur \xe0 Paris";
        let decoded = decode_text(bytes);
        assert!(decoded.text.contains("Résumé"), "got {}", decoded.text);
    }

    #[test]
    fn test_latin1_maps_every_byte() {
        let all: Vec<u8> = (0u8..=255).collect();
        let text = latin1(&all);
        assert_eq!(text.chars().count(), 256);
        assert_eq!(text.chars().nth(0xE9), Some('é'));
    }
}
