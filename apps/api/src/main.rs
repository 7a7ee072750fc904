mod analysis;
mod config;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod resumes;
mod routes;
mod salary;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{KeywordAnalyzer, LlmAnalyzer, ResumeAnalyzer};
use crate::config::{AnalyzerBackend, Config};
use crate::extraction::TextExtractor;
use crate::jobs::JobStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::salary::SalaryFeature;
use crate::state::AppState;
use crate::storage::FsBlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; an invalid value aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model gateway client
    let llm = LlmClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, base: {})",
        llm.model(),
        config.model_base_url
    );

    // Initialize analyzer (LlmAnalyzer by default; swap via ANALYZER_BACKEND)
    let analyzer: Arc<dyn ResumeAnalyzer> = match config.analyzer_backend {
        AnalyzerBackend::Llm => Arc::new(LlmAnalyzer::new(llm.clone())),
        AnalyzerBackend::Keyword => Arc::new(KeywordAnalyzer),
    };
    info!("Analyzer backend: {}", analyzer.backend());

    // Initialize text extraction and file stores
    let extractor = Arc::new(TextExtractor::from_config(&config));
    let resumes = Arc::new(FsBlobStore::new(config.data_dir.join("resumes")));
    let jobs = JobStore::new(Arc::new(FsBlobStore::new(
        config.data_dir.join("job_descriptions"),
    )));
    info!("File store rooted at {}", config.data_dir.display());

    // Salary estimation never blocks startup; a bad table only disables it
    let salary = Arc::new(SalaryFeature::from_config(&config));

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        extractor,
        analyzer,
        resumes,
        jobs,
        salary,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
