use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::text::decode_text;
use crate::state::AppState;

use super::models::{slugify, CreateJobRequest, JobDescription};
use super::store::parse_job;

/// GET /api/job-descriptions
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobDescription>>, AppError> {
    Ok(Json(state.jobs.list().await?))
}

/// GET /api/job-descriptions/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDescription>, AppError> {
    Ok(Json(state.jobs.get(&id).await?))
}

/// POST /api/job-descriptions
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobDescription>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if req.description.trim().is_empty() && req.requirements.is_empty() {
        return Err(AppError::Validation(
            "description or requirements are required".to_string(),
        ));
    }

    let job = JobDescription::new(&req.title, &req.description, req.requirements);
    state.jobs.save(&job).await?;
    info!("Saved job description {}", job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/job-descriptions/upload
///
/// Multipart with a text `file` and an optional `title` field. A file already in
/// the stored `Title:` layout keeps its own title unless one is given.
pub async fn handle_upload_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobDescription>), AppError> {
    let mut title: Option<String> = None;
    let mut upload: Option<(String, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("job.txt").to_string();
                let bytes = field.bytes().await?;
                upload = Some((file_name, decode_text(&bytes).text));
            }
            _ => {}
        }
    }

    let (file_name, text) =
        upload.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{file_name} is empty")));
    }

    let stem = std::path::Path::new(&file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("job");
    let mut job = parse_job(&slugify(stem), &text);
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        job.title = title.trim().to_string();
    }
    job.id = slugify(&job.title);

    state.jobs.save(&job).await?;
    info!("Saved uploaded job description {} from {file_name}", job.id);
    Ok((StatusCode::CREATED, Json(job)))
}

/// DELETE /api/job-descriptions/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.jobs.delete(&id).await?;
    info!("Deleted job description {id}");
    Ok(StatusCode::NO_CONTENT)
}
