use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::pipeline::extract_blocking;
use crate::errors::AppError;
use crate::extraction::{normalize_text, ExtractionMethod, ResumeFormat};
use crate::state::AppState;
use crate::storage::validate_key;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub name: String,
    pub format: ResumeFormat,
    pub method: ExtractionMethod,
    pub characters: usize,
}

#[derive(Debug, Serialize)]
pub struct StoredResume {
    pub name: String,
    pub format: ResumeFormat,
}

#[derive(Debug, Serialize)]
pub struct ResumeTextResponse {
    pub name: String,
    pub method: ExtractionMethod,
    /// Normalised text, as sent to the model.
    pub text: String,
    pub raw_text: String,
}

/// POST /api/upload
///
/// Stores the file first, then extracts. A file whose text cannot be
/// extracted stays stored and the request fails with 422.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            upload = Some((file_name, field.bytes().await?));
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    let name = base_name(&file_name);
    validate_key(&name)?;
    let format = ResumeFormat::from_file_name(&name)?;
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("{name} is empty")));
    }

    state.resumes.put(&name, bytes.clone()).await?;
    info!("Stored resume {name} ({} bytes)", bytes.len());

    let (text, method) = extract_blocking(state.extractor.clone(), name.clone(), bytes)
        .await
        .map_err(|e| {
            warn!("Stored {name} but extraction failed: {e}");
            e
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            name,
            format,
            method,
            characters: text.chars().count(),
        }),
    ))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredResume>>, AppError> {
    let resumes = state
        .resumes
        .list()
        .await?
        .into_iter()
        .filter_map(|name| {
            let format = ResumeFormat::from_file_name(&name).ok()?;
            Some(StoredResume { name, format })
        })
        .collect();
    Ok(Json(resumes))
}

/// GET /api/resume/:name
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ResumeTextResponse>, AppError> {
    let bytes = state.resumes.get(&name).await?;
    let (raw_text, method) = extract_blocking(state.extractor.clone(), name.clone(), bytes).await?;
    Ok(Json(ResumeTextResponse {
        name,
        method,
        text: normalize_text(&raw_text),
        raw_text,
    }))
}

/// Browsers may send a client-side path; only the last component is kept.
fn base_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
