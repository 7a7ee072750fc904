use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s.,;:()@-]").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Cosmetic cleanup applied before keyword scanning or prompting.
///
/// Collapses whitespace, keeps only word characters, whitespace and `.,;:()@-`,
/// and trims. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text, " ");
    let text = DISALLOWED.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = MULTI_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}
