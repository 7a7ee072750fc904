use std::collections::HashSet;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

use super::lenient;
use super::models::ScoringWeights;
use super::pipeline::{analyze_batch, BatchItem, BatchItemResult, BatchSource};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResumesRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resumes: Vec<ResumeTextInput>,
    #[serde(default)]
    pub weights: Option<ScoringWeights>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeTextInput {
    /// Client ids may be numbers or strings; missing ids are generated.
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// POST /api/analyze-resumes
pub async fn handle_analyze_resumes(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeResumesRequest>,
) -> Result<Json<Vec<BatchItemResult>>, AppError> {
    let weights = resolve_weights(req.weights)?;
    let job_description = require_job_description(&req.job_description)?;
    if req.resumes.is_empty() {
        return Err(AppError::Validation("No resumes provided".to_string()));
    }

    let items = req
        .resumes
        .into_iter()
        .map(|resume| BatchItem {
            id: id_or_new(resume.id),
            name: resume.name,
            source: BatchSource::Text(resume.content),
        })
        .collect();

    run_batch(&state, job_description, items, &weights).await
}

/// POST /api/analyze-files
///
/// Multipart fields: `jobDescription` (text) or `jobDescriptionId` (stored job),
/// one or more `files`, and an optional `weights` JSON object.
pub async fn handle_analyze_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<BatchItemResult>>, AppError> {
    let mut job_text: Option<String> = None;
    let mut job_id: Option<String> = None;
    let mut weights: Option<ScoringWeights> = None;
    let mut items = Vec::new();
    let mut ids = HashSet::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobDescription" => job_text = Some(field.text().await?),
            "jobDescriptionId" => job_id = Some(field.text().await?),
            "weights" => {
                let raw = field.text().await?;
                let parsed = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Validation(format!("Invalid weights: {e}")))?;
                weights = Some(parsed);
            }
            "files" | "files[]" | "file" => {
                let file_name = field.file_name().unwrap_or("resume.txt").to_string();
                let bytes = field.bytes().await?;
                items.push(BatchItem {
                    id: unique_id(&mut ids, &file_name),
                    name: None,
                    source: BatchSource::File { file_name, bytes },
                });
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    let weights = resolve_weights(weights)?;
    let job_text = match (job_text.filter(|t| !t.trim().is_empty()), job_id) {
        (Some(text), _) => text,
        (None, Some(id)) if !id.trim().is_empty() => {
            state.jobs.get(id.trim()).await?.analysis_text()
        }
        _ => String::new(),
    };
    let job_description = require_job_description(&job_text)?;
    if items.is_empty() {
        return Err(AppError::Validation("No resume files provided".to_string()));
    }

    run_batch(&state, job_description, items, &weights).await
}

async fn run_batch(
    state: &AppState,
    job_description: &str,
    items: Vec<BatchItem>,
    weights: &ScoringWeights,
) -> Result<Json<Vec<BatchItemResult>>, AppError> {
    let results = analyze_batch(
        state.analyzer.as_ref(),
        state.extractor.clone(),
        job_description,
        items,
        weights,
    )
    .await;

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    info!(
        "Batch finished with {}: {} analyzed, {failed} failed",
        state.analyzer.backend(),
        results.len() - failed
    );
    Ok(Json(results))
}

fn require_job_description(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        Err(AppError::Validation("Job description is required".to_string()))
    } else {
        Ok(text)
    }
}

fn resolve_weights(weights: Option<ScoringWeights>) -> Result<ScoringWeights, AppError> {
    let weights = weights.unwrap_or_default();
    weights
        .validate()
        .map_err(|e| AppError::Validation(format!("Invalid weights: {e}")))?;
    Ok(weights)
}

/// `file_name`, or `file_name#2`, `file_name#3`... once that id is taken.
fn unique_id(taken: &mut HashSet<String>, file_name: &str) -> String {
    let mut id = file_name.to_string();
    let mut n = 1;
    while !taken.insert(id.clone()) {
        n += 1;
        id = format!("{file_name}#{n}");
    }
    id
}

fn id_or_new(id: String) -> String {
    if id.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        id
    }
}
