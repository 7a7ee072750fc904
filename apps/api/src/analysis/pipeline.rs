//! Batch pipeline: extract → analyze, one resume at a time in submission order.
//!
//! A failing item never aborts the batch. Its slot in the output carries an
//! `error` instead of an analysis, so the output always lines up with the input.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{ExtractionError, ExtractionMethod, TextExtractor};

use super::analyzer::ResumeAnalyzer;
use super::contact::{extract_contact_info, guess_candidate_name, ContactInfo};
use super::models::{AnalysisResult, ScoringWeights};

/// Where an item's resume text comes from.
#[derive(Debug, Clone)]
pub enum BatchSource {
    /// Text the client already extracted.
    Text(String),
    /// An uploaded file, extracted server-side.
    File { file_name: String, bytes: Bytes },
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: String,
    /// Display name; guessed from the text when absent.
    pub name: Option<String>,
    pub source: BatchSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchErrorKind {
    ExtractionFailed,
    ModelUnavailable,
    InvalidInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub kind: BatchErrorKind,
    pub message: String,
}

impl From<&AppError> for BatchError {
    fn from(err: &AppError) -> Self {
        let kind = match err {
            AppError::Extraction(_) => BatchErrorKind::ExtractionFailed,
            AppError::ModelUnavailable(_) => BatchErrorKind::ModelUnavailable,
            _ => BatchErrorKind::InvalidInput,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// One output row. Successful rows flatten the `AnalysisResult` fields in
/// beside `id` and `name`; failed rows carry `error` instead.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchError>,
}

impl BatchItemResult {
    fn failed(id: String, name: String, err: &AppError) -> Self {
        Self {
            id,
            name,
            analysis: None,
            contact: None,
            extraction_method: None,
            error: Some(err.into()),
        }
    }
}

pub async fn analyze_batch(
    analyzer: &dyn ResumeAnalyzer,
    extractor: Arc<TextExtractor>,
    job_description: &str,
    items: Vec<BatchItem>,
    weights: &ScoringWeights,
) -> Vec<BatchItemResult> {
    let total = items.len();
    info!("Analyzing batch of {total} resumes");

    let mut results = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let result = analyze_item(analyzer, extractor.clone(), job_description, item, weights).await;
        if let Some(err) = &result.error {
            warn!(
                "Batch item {}/{total} ({}) failed: {}",
                index + 1,
                result.id,
                err.message
            );
        }
        results.push(result);
    }
    results
}

async fn analyze_item(
    analyzer: &dyn ResumeAnalyzer,
    extractor: Arc<TextExtractor>,
    job_description: &str,
    item: BatchItem,
    weights: &ScoringWeights,
) -> BatchItemResult {
    let BatchItem { id, name, source } = item;

    let (text, file_name, method) = match source {
        BatchSource::Text(content) => (content, String::new(), None),
        BatchSource::File { file_name, bytes } => {
            match extract_blocking(extractor, file_name.clone(), bytes).await {
                Ok((text, method)) => (text, file_name, Some(method)),
                Err(err) => {
                    let name = name.unwrap_or_else(|| guess_candidate_name("", &file_name));
                    return BatchItemResult::failed(id, name, &err);
                }
            }
        }
    };

    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| guess_candidate_name(&text, &file_name));

    if text.trim().is_empty() {
        let err = AppError::Validation("resume content is empty".to_string());
        return BatchItemResult::failed(id, name, &err);
    }

    match analyzer.analyze(job_description, &text, &name, weights).await {
        Ok(analysis) => BatchItemResult {
            id,
            contact: Some(extract_contact_info(&text)),
            name,
            analysis: Some(analysis),
            extraction_method: method,
            error: None,
        },
        Err(err) => BatchItemResult::failed(id, name, &err),
    }
}

/// Runs extraction on the blocking pool.
pub async fn extract_blocking(
    extractor: Arc<TextExtractor>,
    file_name: String,
    bytes: Bytes,
) -> Result<(String, ExtractionMethod), AppError> {
    let extracted = tokio::task::spawn_blocking(move || extractor.extract(&file_name, &bytes))
        .await
        .map_err(|e| {
            AppError::Extraction(ExtractionError::Io(std::io::Error::other(format!(
                "extraction task failed: {e}"
            ))))
        })??;
    Ok((extracted.text, extracted.method))
}
