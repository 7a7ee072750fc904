use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[\s-][A-Z][a-z]+)*,\s*[A-Z]{2}\b").unwrap()
});
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://)?(?:www\.)?[a-z0-9-]+(?:\.[a-z0-9-]+)*\.(?:com|io|dev|org|net|me|app|co|ai|in)(?:/[^\s,;()<>]*)?").unwrap()
});
static NAME_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-zA-Z'\-]*\.?$").unwrap());

/// Contact details found in resume text. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

pub fn extract_contact_info(text: &str) -> ContactInfo {
    ContactInfo {
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(text).map(|m| m.as_str().to_string()),
        location: LOCATION.find(text).map(|m| m.as_str().to_string()),
    }
}

/// Profile URLs grouped the way the online-presence report wants them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUrls {
    pub linked_in: Vec<String>,
    pub github: Vec<String>,
    pub websites: Vec<String>,
}

pub fn extract_profile_urls(text: &str) -> ProfileUrls {
    let mut urls = ProfileUrls::default();

    for m in URL.find_iter(text) {
        // Skip the domain half of an email address.
        if m.start() > 0 && text[..m.start()].ends_with('@') {
            continue;
        }
        let url = m.as_str().trim_end_matches(['.', '/']).to_string();
        let lower = url.to_ascii_lowercase();

        let bucket = if lower.contains("linkedin.com") {
            &mut urls.linked_in
        } else if lower.contains("github.com") {
            &mut urls.github
        } else {
            &mut urls.websites
        };
        if !bucket.contains(&url) {
            bucket.push(url);
        }
    }
    urls
}

/// Best guess at the candidate's name.
///
/// The first non-empty line of two to four capitalised words wins (resumes
/// almost always open with the name). Otherwise the file stem is humanised:
/// `jane_roe-cv.pdf` → `Jane Roe Cv`.
pub fn guess_candidate_name(text: &str, file_name: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|line| !line.is_empty());

    if let Some(line) = first_line {
        let words: Vec<&str> = line.split_whitespace().collect();
        if (2..=4).contains(&words.len())
            && words.iter().all(|w| NAME_WORD.is_match(w))
            && !line.contains('@')
        {
            return words.join(" ");
        }
    }

    humanize_stem(file_name)
}

fn humanize_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let name = stem
        .split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");

    if name.is_empty() {
        "Candidate".to_string()
    } else {
        name
    }
}
