use std::sync::Arc;

use crate::analysis::ResumeAnalyzer;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::jobs::JobStore;
use crate::llm_client::LlmClient;
use crate::salary::SalaryFeature;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Used directly only by the health check; analysis goes through `analyzer`.
    pub llm: LlmClient,
    pub extractor: Arc<TextExtractor>,
    /// Pluggable analyzer. Default: LlmAnalyzer. Swap via ANALYZER_BACKEND.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
    /// Uploaded resume files, keyed by file name.
    pub resumes: Arc<dyn BlobStore>,
    pub jobs: JobStore,
    pub salary: Arc<SalaryFeature>,
}
