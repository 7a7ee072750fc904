use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;

use crate::extraction::SUPPORTED_EXTENSIONS;
use crate::state::AppState;

/// GET /health
/// Service status plus an informational check of the model server. An
/// unreachable model still reports `"status": "ok"`.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let (reachable, models) = match state.llm.ping().await {
        Ok(models) => (true, models),
        Err(e) => {
            debug!("Model check failed: {e}");
            (false, Vec::new())
        }
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "analyzer": state.analyzer.backend(),
        "model": {
            "name": state.llm.model(),
            "baseUrl": state.config.model_base_url,
            "reachable": reachable,
            "models": models
        },
        "formats": SUPPORTED_EXTENSIONS,
        "salary": if state.salary.is_enabled() { "enabled" } else { "disabled" }
    }))
}
