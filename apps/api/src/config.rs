use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Which analyzer implementation handles scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerBackend {
    /// Prompt the local model and parse its JSON reply.
    Llm,
    /// Keyword overlap only; never touches the network.
    Keyword,
}

impl AnalyzerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Keyword => "keyword",
        }
    }
}

impl FromStr for AnalyzerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "keyword" => Ok(Self::Keyword),
            other => bail!("unknown analyzer backend '{other}' (expected 'llm' or 'keyword')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; a present but invalid value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub model_base_url: String,
    pub model_name: String,
    pub model_timeout_secs: u64,
    pub model_max_retries: u32,
    pub analyzer_backend: AnalyzerBackend,
    pub data_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub tesseract_bin: PathBuf,
    pub pdftoppm_bin: PathBuf,
    pub antiword_bin: PathBuf,
    pub ocr_dpi: u32,
    pub salary_table_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: parse_var("PORT", &get("PORT", "8000"))?,
            rust_log: get("RUST_LOG", "info"),
            model_base_url: get("MODEL_BASE_URL", "http://localhost:11434")
                .trim_end_matches('/')
                .to_string(),
            model_name: get("MODEL_NAME", "mistral"),
            model_timeout_secs: parse_var("MODEL_TIMEOUT_SECS", &get("MODEL_TIMEOUT_SECS", "120"))?,
            model_max_retries: parse_var("MODEL_MAX_RETRIES", &get("MODEL_MAX_RETRIES", "0"))?,
            analyzer_backend: parse_var("ANALYZER_BACKEND", &get("ANALYZER_BACKEND", "llm"))?,
            data_dir: PathBuf::from(get("DATA_DIR", "./data")),
            scratch_dir: PathBuf::from(get("SCRATCH_DIR", "./parsed_resumes")),
            tesseract_bin: PathBuf::from(get("TESSERACT_BIN", "tesseract")),
            pdftoppm_bin: PathBuf::from(get("PDFTOPPM_BIN", "pdftoppm")),
            antiword_bin: PathBuf::from(get("ANTIWORD_BIN", "antiword")),
            ocr_dpi: parse_var("OCR_DPI", &get("OCR_DPI", "300"))?,
            salary_table_path: lookup("SALARY_TABLE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Environment variable '{key}' has invalid value '{value}'"))
}
