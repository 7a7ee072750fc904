//! Salary estimation from experience level and job title.
//!
//! A range table (in thousands of USD per year) keyed by experience level, scaled
//! by a title multiplier. The estimate is the midpoint of the scaled range, so
//! the same request always gets the same answer.
//!
//! The table is either built in or loaded from `SALARY_TABLE_PATH`. A configured
//! table that cannot be loaded disables the feature; startup carries on.

pub mod handlers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

/// Level used when the request names one the table does not know.
pub const DEFAULT_LEVEL: &str = "Associate";

/// Level assumed when the request names none.
pub const REQUEST_LEVEL: &str = "Entry level";

const BUILT_IN_RANGES: &[(&str, f64, f64)] = &[
    ("Internship", 40.0, 60.0),
    ("Entry level", 60.0, 85.0),
    ("Associate", 80.0, 110.0),
    ("Mid-Senior level", 100.0, 140.0),
    ("Director", 130.0, 180.0),
    ("Executive", 160.0, 250.0),
];

/// First matching group wins.
const TITLE_MULTIPLIERS: &[(&[&str], f64)] = &[
    (&["senior", "lead", "architect"], 1.25),
    (&["manager", "head", "director"], 1.4),
    (&["junior", "associate"], 0.85),
];

#[derive(Debug, Error)]
pub enum SalaryError {
    #[error("Cannot read salary table {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid salary table: {0}")]
    InvalidTable(String),

    #[error("Invalid salary request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_experience_level")]
    pub experience_level: String,
    #[serde(default = "default_as_monthly")]
    pub as_monthly: bool,
}

fn default_experience_level() -> String {
    REQUEST_LEVEL.to_string()
}

fn default_as_monthly() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPrediction {
    pub success: bool,
    pub estimated_salary: String,
    pub yearly: String,
    pub monthly: String,
    /// Yearly estimate in thousands.
    pub salary_value: u32,
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct SalaryService {
    ranges: BTreeMap<String, SalaryRange>,
}

impl SalaryService {
    pub fn built_in() -> Self {
        let ranges = BUILT_IN_RANGES
            .iter()
            .map(|(level, min, max)| (level.to_string(), SalaryRange { min: *min, max: *max }))
            .collect();
        Self { ranges }
    }

    /// Loads a JSON table: `{"Entry level": {"min": 60, "max": 85}, ...}`.
    /// The table must contain the default level.
    pub fn from_file(path: &Path) -> Result<Self, SalaryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SalaryError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, SalaryError> {
        let ranges: BTreeMap<String, SalaryRange> =
            serde_json::from_str(raw).map_err(|e| SalaryError::InvalidTable(e.to_string()))?;

        for (level, range) in &ranges {
            let valid = range.min.is_finite()
                && range.max.is_finite()
                && range.min > 0.0
                && range.min <= range.max;
            if !valid {
                return Err(SalaryError::InvalidTable(format!(
                    "range for '{level}' must satisfy 0 < min <= max"
                )));
            }
        }
        if !ranges.contains_key(DEFAULT_LEVEL) {
            return Err(SalaryError::InvalidTable(format!(
                "missing default level '{DEFAULT_LEVEL}'"
            )));
        }
        Ok(Self { ranges })
    }

    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }

    pub fn predict(&self, req: &SalaryRequest) -> Result<SalaryPrediction, SalaryError> {
        if req.title.trim().is_empty() {
            return Err(SalaryError::InvalidRequest("title is required".to_string()));
        }

        let range = self
            .range_for(&req.experience_level)
            .or_else(|| self.ranges.get(DEFAULT_LEVEL).copied())
            .ok_or_else(|| SalaryError::InvalidTable(format!("missing '{DEFAULT_LEVEL}'")))?;

        let yearly = range.midpoint() * title_multiplier(&req.title) * 1000.0;
        let monthly = yearly / 12.0;

        let yearly_text = format!("{}/year", format_usd(yearly));
        let monthly_text = format!("{}/month", format_usd(monthly));

        Ok(SalaryPrediction {
            success: true,
            estimated_salary: if req.as_monthly {
                monthly_text.clone()
            } else {
                yearly_text.clone()
            },
            yearly: yearly_text,
            monthly: monthly_text,
            salary_value: (yearly / 1000.0).round() as u32,
            fallback: true,
        })
    }

    /// Level lookup ignoring case and surrounding whitespace.
    fn range_for(&self, level: &str) -> Option<SalaryRange> {
        let level = level.trim();
        self.ranges
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(level))
            .map(|(_, range)| *range)
    }
}

pub fn title_multiplier(title: &str) -> f64 {
    let title = title.to_lowercase();
    TITLE_MULTIPLIERS
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| title.contains(t)))
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// `$1,234,567.89`
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.max(0.0) * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{:02}", cents % 100)
}

/// Whether salary estimation is available, decided once at startup.
#[derive(Debug, Clone)]
pub enum SalaryFeature {
    Enabled(SalaryService),
    Disabled { reason: String },
}

impl SalaryFeature {
    pub fn from_config(config: &Config) -> Self {
        match &config.salary_table_path {
            None => {
                info!("Salary estimation enabled with built-in table");
                SalaryFeature::Enabled(SalaryService::built_in())
            }
            Some(path) => match SalaryService::from_file(path) {
                Ok(service) => {
                    info!("Salary estimation enabled with table {}", path.display());
                    SalaryFeature::Enabled(service)
                }
                Err(e) => {
                    warn!("Salary estimation disabled: {e}");
                    SalaryFeature::Disabled {
                        reason: e.to_string(),
                    }
                }
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, SalaryFeature::Enabled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, level: Option<&str>) -> SalaryRequest {
        SalaryRequest {
            title: title.to_string(),
            experience_level: level.unwrap_or(REQUEST_LEVEL).to_string(),
            as_monthly: true,
        }
    }

    #[test]
    fn test_midpoint_of_level_range() {
        let prediction = SalaryService::built_in()
            .predict(&request("Software Engineer", Some("Mid-Senior level")))
            .unwrap();
        assert_eq!(prediction.salary_value, 120);
        assert_eq!(prediction.yearly, "$120,000.00/year");
        assert_eq!(prediction.monthly, "$10,000.00/month");
        assert_eq!(prediction.estimated_salary, prediction.monthly);
        assert!(prediction.fallback);
    }

    #[test]
    fn test_title_multipliers() {
        assert_eq!(title_multiplier("Senior Data Engineer"), 1.25);
        assert_eq!(title_multiplier("Head of Growth"), 1.4);
        assert_eq!(title_multiplier("Junior Developer"), 0.85);
        assert_eq!(title_multiplier("Developer"), 1.0);
        // "senior" is checked before "manager"
        assert_eq!(title_multiplier("Senior Manager"), 1.25);
    }

    #[test]
    fn test_unknown_level_uses_associate() {
        let service = SalaryService::built_in();
        let unknown = service.predict(&request("Analyst", Some("Wizard"))).unwrap();
        assert_eq!(unknown.salary_value, 95);
    }

    #[test]
    fn test_missing_level_defaults_to_entry_level() {
        let req: SalaryRequest = serde_json::from_str(r#"{"title": "Analyst"}"#).unwrap();
        assert_eq!(req.experience_level, "Entry level");
        assert!(req.as_monthly);
        let prediction = SalaryService::built_in().predict(&req).unwrap();
        assert_eq!(prediction.salary_value, 73);
        assert_eq!(prediction.yearly, "$72,500.00/year");
    }

    #[test]
    fn test_level_lookup_ignores_case() {
        let prediction = SalaryService::built_in()
            .predict(&request("Analyst", Some(" entry LEVEL ")))
            .unwrap();
        assert_eq!(prediction.salary_value, 73);
    }

    #[test]
    fn test_yearly_when_not_monthly() {
        let mut req = request("Lead Engineer", Some("Executive"));
        req.as_monthly = false;
        let prediction = SalaryService::built_in().predict(&req).unwrap();
        // 205 × 1.25 = 256.25k
        assert_eq!(prediction.estimated_salary, "$256,250.00/year");
        assert_eq!(prediction.salary_value, 256);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let err = SalaryService::built_in()
            .predict(&request("  ", None))
            .unwrap_err();
        assert!(matches!(err, SalaryError::InvalidRequest(_)));
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.5), "$999.50");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_table_from_json() {
        let service = SalaryService::from_json(
            r#"{"Associate": {"min": 50, "max": 70}, "Staff": {"min": 150, "max": 190}}"#,
        )
        .unwrap();
        assert_eq!(service.levels().collect::<Vec<_>>(), vec!["Associate", "Staff"]);
        let prediction = service.predict(&request("Engineer", Some("Staff"))).unwrap();
        assert_eq!(prediction.salary_value, 170);
    }

    #[test]
    fn test_invalid_tables() {
        assert!(SalaryService::from_json("not json").is_err());
        assert!(SalaryService::from_json(r#"{"Staff": {"min": 1, "max": 2}}"#).is_err());
        assert!(SalaryService::from_json(r#"{"Associate": {"min": 90, "max": 10}}"#).is_err());
    }

    #[test]
    fn test_missing_table_file_disables_feature() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = crate::config::tests::test_config();
        config.salary_table_path = Some(dir.path().join("missing.json"));
        match SalaryFeature::from_config(&config) {
            SalaryFeature::Disabled { reason } => assert!(reason.contains("missing.json")),
            SalaryFeature::Enabled(_) => panic!("expected disabled"),
        }
    }

    #[test]
    fn test_no_table_path_uses_built_in() {
        let config = crate::config::tests::test_config();
        assert!(SalaryFeature::from_config(&config).is_enabled());
    }
}
