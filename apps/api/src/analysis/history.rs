//! Dated roles and degree lines read from plain resume text.
//!
//! Dates are `(year, month)` pairs. A year on its own counts as January.

use std::sync::LazyLock;

use regex::Regex;

use super::models::{EducationDetail, ExperienceDetail};

pub type YearMonth = (i32, u32);

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// `Mar 2021`, `March, 2021`, `03/2021` or `2021`.
const DATE: &str = r"(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(?:19|20)\d{2}|\d{1,2}/(?:19|20)\d{2}|(?:19|20)\d{2})";

static DATE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<start>{DATE})\s*(?:-|–|—|to)\s*(?P<end>{DATE}|present|current|now)\b"
    ))
    .unwrap()
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

static DEGREE_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:bachelor(?:'?s)?|master(?:'?s)?|phd|ph\.d\.|doctorate|associate(?:'?s)? degree|diploma|certificate)\b|\b(?:b\.s\.|m\.s\.|b\.a\.|m\.a\.|b\.e\.|m\.e\.)|\b(?:b\.tech|m\.tech)\b",
    )
    .unwrap()
});

static FIELD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^,;]*?\bin\s+([a-z][a-z &]*[a-z])").unwrap()
});

static FIELD_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^,;]*?\bof\s+([a-z][a-z &]*[a-z])").unwrap()
});

static FIELD_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:at|from|university|college|institute|school)\b").unwrap()
});

static INSTITUTIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:University|College|Institute|School) of [A-Z][A-Za-z]*(?: [A-Za-z]+)*",
        r"\b[A-Z][A-Za-z&]*(?: [A-Z][A-Za-z&]*)* (?:University|College|Institute)\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static GPA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgpa\b[:\s]*([0-4](?:\.\d{1,2})?)").unwrap());

/// A role line carrying a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRole {
    pub title: String,
    pub company: String,
    pub start: YearMonth,
    pub end: YearMonth,
    /// The date range as written.
    pub range: String,
}

impl DatedRole {
    pub fn months(&self) -> u32 {
        months_between(self.start, self.end)
    }

    pub fn duration(&self) -> String {
        format_duration(self.months())
    }

    pub fn to_detail(&self) -> ExperienceDetail {
        ExperienceDetail {
            title: self.title.clone(),
            company: self.company.clone(),
            duration: self.duration(),
            description: self.range.clone(),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<YearMonth> {
    let lower = raw.trim().to_lowercase();
    let year: i32 = YEAR.find(&lower)?.as_str().parse().ok()?;

    if let Some((_, month)) = MONTHS.iter().find(|(name, _)| lower.starts_with(name)) {
        return Some((year, *month));
    }
    if let Some((month, _)) = lower.split_once('/') {
        let month: u32 = month.trim().parse().ok()?;
        return (1..=12).contains(&month).then_some((year, month));
    }
    Some((year, 1))
}

fn parse_end(raw: &str, today: YearMonth) -> Option<YearMonth> {
    match raw.trim().to_lowercase().as_str() {
        "present" | "current" | "now" => Some(today),
        _ => parse_date(raw),
    }
}

/// Whole months from `start` to `end`; zero when `end` comes first.
pub fn months_between(start: YearMonth, end: YearMonth) -> u32 {
    let months = (end.0 - start.0) * 12 + end.1 as i32 - start.1 as i32;
    months.max(0) as u32
}

pub fn format_duration(months: u32) -> String {
    let unit = |n: u32, word: &str| {
        if n == 1 {
            format!("1 {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    match (months / 12, months % 12) {
        (0, m) => unit(m, "month"),
        (y, 0) => unit(y, "year"),
        (y, m) => format!("{} {}", unit(y, "year"), unit(m, "month")),
    }
}

/// Every line holding a date range, read as a role. The heading is the rest of
/// the line, or the previous non-empty line when the range stands alone.
/// Degree lines are skipped.
pub fn dated_roles(text: &str, today: YearMonth) -> Vec<DatedRole> {
    let mut roles = Vec::new();
    let mut previous = "";

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        let Some(caps) = DATE_RANGE.captures(line) else {
            previous = line;
            continue;
        };
        let (Some(whole), Some(start), Some(end)) = (caps.get(0), caps.name("start"), caps.name("end"))
        else {
            continue;
        };

        let rest = format!("{} {}", &line[..whole.start()], &line[whole.end()..]);
        let rest = rest.trim_matches(|c: char| c.is_whitespace() || "|,-–—()[]:".contains(c));
        let heading = if rest.is_empty() { previous } else { rest };
        previous = line;

        if DEGREE_MENTION.is_match(heading) {
            continue;
        }
        let (Some(start), Some(end)) = (parse_date(start.as_str()), parse_end(end.as_str(), today))
        else {
            continue;
        };
        if end < start {
            continue;
        }

        let (title, company) = split_heading(heading);
        roles.push(DatedRole {
            title,
            company,
            start,
            end,
            range: whole.as_str().to_string(),
        });
    }
    roles
}

fn split_heading(heading: &str) -> (String, String) {
    for sep in [" at ", " @ ", " | ", ", "] {
        if let Some((title, company)) = heading.split_once(sep) {
            return (title.trim().to_string(), company.trim().to_string());
        }
    }
    (heading.trim().to_string(), String::new())
}

/// Months covered by at least one role. Overlapping roles count once.
pub fn covered_months(roles: &[DatedRole]) -> u32 {
    let index = |(year, month): YearMonth| year * 12 + month as i32;
    let mut spans: Vec<(i32, i32)> = roles
        .iter()
        .map(|role| (index(role.start), index(role.end)))
        .collect();
    spans.sort_unstable();

    let mut total = 0;
    let mut current: Option<(i32, i32)> = None;
    for (start, end) in spans {
        current = match current {
            Some((s, e)) if start <= e => Some((s, e.max(end))),
            Some((s, e)) => {
                total += e - s;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((s, e)) = current {
        total += e - s;
    }
    total.max(0) as u32
}

/// One row per line that names a degree, read together with the line after it.
/// Lines with no field, institution or year are dropped.
pub fn education_rows(text: &str) -> Vec<EducationDetail> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut rows = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(found) = DEGREE_MENTION.find(line) else {
            continue;
        };
        let next = lines.get(i + 1).copied().unwrap_or_default();
        let context = format!("{line}\n{next}");

        let field = field_after(&line[found.end()..]);
        let institution = INSTITUTIONS
            .iter()
            .find_map(|re| re.find(&context))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let graduation_year = YEAR
            .find_iter(&context)
            .last()
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        if field.is_empty() && institution.is_empty() && graduation_year.is_empty() {
            continue;
        }
        let gpa = GPA
            .captures(&context)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        rows.push(EducationDetail {
            degree: found.as_str().to_string(),
            field,
            institution,
            graduation_year,
            gpa,
            relevance: String::new(),
        });
    }
    rows
}

/// "in X" wins over "of X", so "Bachelor of Science in Physics" reads as Physics.
fn field_after(tail: &str) -> String {
    let Some(field) = [&*FIELD_IN, &*FIELD_OF]
        .iter()
        .find_map(|re| re.captures(tail)?.get(1))
    else {
        return String::new();
    };
    let field = field.as_str();
    let end = FIELD_END.find(field).map_or(field.len(), |m| m.start());
    field[..end].trim().to_string()
}
