use std::iter::Peekable;
use std::str::Chars;

use encoding_rs::WINDOWS_1252;

use super::ExtractionError;

/// Destinations whose content is metadata, not body text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "headerl",
    "headerr",
    "headerf",
    "footer",
    "footerl",
    "footerr",
    "footerf",
    "listtable",
    "listoverridetable",
    "rsidtbl",
    "generator",
    "xmlnstbl",
    "themedata",
    "colorschememapping",
    "latentstyles",
    "datastore",
    "object",
    "fldinst",
];

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    uc: usize,
}

/// Strips RTF control words and groups, keeping the visible body text.
///
/// Handles `\par`/`\line`/`\tab`, hex escapes (`\'e9`, read as Windows-1252),
/// `\uN` code points with their `\ucN` fallback characters, and `\*`
/// destinations. Anything unknown is dropped.
pub fn rtf_to_text(rtf: &str) -> Result<String, ExtractionError> {
    if !rtf.trim_start().starts_with("{\\rtf") {
        return Err(ExtractionError::Converter(
            "input is not an RTF document".to_string(),
        ));
    }

    let mut out = String::with_capacity(rtf.len() / 2);
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState { skip: false, uc: 1 };
    // Fallback characters still to be dropped after a \uN.
    let mut pending_skip = 0usize;
    let mut chars = rtf.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                stack.push(state);
                pending_skip = 0;
            }
            '}' => {
                state = stack.pop().unwrap_or(state);
                pending_skip = 0;
            }
            '\r' | '\n' => {}
            '\\' => {
                let Some(&next) = chars.peek() else { break };
                match next {
                    '\\' | '{' | '}' => {
                        chars.next();
                        emit(&mut out, next, state, &mut pending_skip);
                    }
                    '\'' => {
                        chars.next();
                        let hex: String = chars.by_ref().take(2).collect();
                        if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                            let bytes = [byte];
                            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
                            for ch in decoded.chars() {
                                emit(&mut out, ch, state, &mut pending_skip);
                            }
                        }
                    }
                    '*' => {
                        chars.next();
                        state.skip = true;
                    }
                    '~' => {
                        chars.next();
                        emit(&mut out, ' ', state, &mut pending_skip);
                    }
                    '_' => {
                        chars.next();
                        emit(&mut out, '-', state, &mut pending_skip);
                    }
                    '\r' | '\n' => {
                        chars.next();
                        emit(&mut out, '\n', state, &mut pending_skip);
                    }
                    c if c.is_ascii_alphabetic() => {
                        let (word, param) = read_control_word(&mut chars);
                        apply_control_word(&word, param, &mut state, &mut out, &mut pending_skip);
                    }
                    _ => {
                        // Other control symbols (\-, \|, \:) carry no text.
                        chars.next();
                    }
                }
            }
            _ => emit(&mut out, c, state, &mut pending_skip),
        }
    }

    Ok(tidy(&out))
}

fn emit(out: &mut String, c: char, state: GroupState, pending_skip: &mut usize) {
    if *pending_skip > 0 {
        *pending_skip -= 1;
        return;
    }
    if !state.skip {
        out.push(c);
    }
}

fn read_control_word(chars: &mut Peekable<Chars<'_>>) -> (String, Option<i32>) {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }

    let mut digits = String::new();
    if chars.peek() == Some(&'-') {
        digits.push('-');
        chars.next();
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            chars.next();
        } else {
            break;
        }
    }

    // A single space delimits the control word and is not part of the text.
    if chars.peek() == Some(&' ') {
        chars.next();
    }

    (word, digits.parse().ok())
}

fn apply_control_word(
    word: &str,
    param: Option<i32>,
    state: &mut GroupState,
    out: &mut String,
    pending_skip: &mut usize,
) {
    if SKIPPED_DESTINATIONS.contains(&word) {
        state.skip = true;
        return;
    }

    let symbol = match word {
        "par" | "line" | "sect" | "page" => Some('\n'),
        "tab" => Some('\t'),
        "emdash" | "endash" => Some('-'),
        "bullet" => Some('•'),
        "lquote" | "rquote" => Some('\''),
        "ldblquote" | "rdblquote" => Some('"'),
        "uc" => {
            state.uc = param.unwrap_or(1).max(0) as usize;
            None
        }
        "u" => {
            if let Some(code) = param {
                // Code points above 32767 are written as negative 16-bit values.
                let code = if code < 0 { code + 65536 } else { code };
                if let Some(ch) = char::from_u32(code as u32) {
                    emit(out, ch, *state, pending_skip);
                }
                *pending_skip = state.uc;
            }
            None
        }
        _ => None,
    };

    if let Some(c) = symbol {
        emit(out, c, *state, pending_skip);
    }
}

fn tidy(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
