//! Job descriptions persisted as plain `<id>.txt` files in a `BlobStore`.
//!
//! Layout:
//!
//! ```text
//! Title: Backend Engineer
//! Requirements:
//! - Python
//! - AWS
//!
//! Free-text description...
//! ```
//!
//! Files dropped in by hand without the header are still readable; their title
//! comes from the key.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::storage::{BlobStore, StorageError};

use super::models::JobDescription;

const EXTENSION: &str = ".txt";

#[derive(Clone)]
pub struct JobStore {
    blobs: Arc<dyn BlobStore>,
}

impl JobStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// All readable descriptions, ordered by id. Unreadable entries are skipped.
    pub async fn list(&self) -> Result<Vec<JobDescription>, StorageError> {
        let mut jobs = Vec::new();
        for key in self.blobs.list().await? {
            let Some(id) = key.strip_suffix(EXTENSION) else {
                continue;
            };
            match self.blobs.get(&key).await {
                Ok(bytes) => jobs.push(parse_job(id, &String::from_utf8_lossy(&bytes))),
                Err(e) => warn!("Skipping job description {key}: {e}"),
            }
        }
        Ok(jobs)
    }

    pub async fn get(&self, id: &str) -> Result<JobDescription, StorageError> {
        let bytes = self.blobs.get(&key_for(id)).await?;
        Ok(parse_job(id, &String::from_utf8_lossy(&bytes)))
    }

    /// Overwrites any description with the same id.
    pub async fn save(&self, job: &JobDescription) -> Result<(), StorageError> {
        debug!("Saving job description {}", job.id);
        self.blobs
            .put(&key_for(&job.id), Bytes::from(render_job(job)))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.blobs.delete(&key_for(id)).await
    }
}

fn key_for(id: &str) -> String {
    format!("{id}{EXTENSION}")
}

pub fn render_job(job: &JobDescription) -> String {
    let mut out = format!("Title: {}\n", job.title);
    if !job.requirements.is_empty() {
        out.push_str("Requirements:\n");
        for requirement in &job.requirements {
            out.push_str("- ");
            out.push_str(requirement);
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(&job.description);
    out.push('\n');
    out
}

pub fn parse_job(id: &str, content: &str) -> JobDescription {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.lines().peekable();

    let title = match lines.peek().and_then(|l| l.trim().strip_prefix("Title:")) {
        Some(title) => {
            let title = title.trim().to_string();
            lines.next();
            title
        }
        None => {
            return JobDescription {
                id: id.to_string(),
                title: title_from_id(id),
                description: content.trim().to_string(),
                requirements: Vec::new(),
            }
        }
    };

    let mut requirements = Vec::new();
    if lines.peek().is_some_and(|l| l.trim() == "Requirements:") {
        lines.next();
        while let Some(item) = lines.peek().and_then(|l| l.trim().strip_prefix('-')) {
            let item = item.trim();
            if !item.is_empty() {
                requirements.push(item.to_string());
            }
            lines.next();
        }
    }

    let description = lines.collect::<Vec<&str>>().join("\n").trim().to_string();

    JobDescription {
        id: id.to_string(),
        title,
        description,
        requirements,
    }
}

fn title_from_id(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FsBlobStore;

    fn sample() -> JobDescription {
        JobDescription::new(
            "Backend Engineer",
            "Build and run APIs.\nOn-call one week in six.",
            vec!["Python".into(), "AWS".into()],
        )
    }

    #[test]
    fn test_render_layout() {
        assert_eq!(
            render_job(&sample()),
            "Title: Backend Engineer\nRequirements:\n- Python\n- AWS\n\nBuild and run APIs.\nOn-call one week in six.\n"
        );
    }

    #[test]
    fn test_parse_reads_rendered_layout() {
        let parsed = parse_job("backend-engineer", &render_job(&sample()));
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_parse_without_requirements() {
        let parsed = parse_job("qa", "Title: QA Lead\n\nTest things.");
        assert_eq!(parsed.title, "QA Lead");
        assert!(parsed.requirements.is_empty());
        assert_eq!(parsed.description, "Test things.");
    }

    #[test]
    fn test_headerless_file_takes_title_from_id() {
        let parsed = parse_job("data-scientist", "We need someone who knows SQL.\n");
        assert_eq!(parsed.title, "Data Scientist");
        assert_eq!(parsed.description, "We need someone who knows SQL.");
    }

    #[tokio::test]
    async fn test_store_save_get_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(Arc::new(FsBlobStore::new(dir.path())));

        store.save(&sample()).await.unwrap();
        store
            .save(&JobDescription::new("Analyst", "Numbers.", vec![]))
            .await
            .unwrap();

        assert_eq!(store.get("backend-engineer").await.unwrap(), sample());
        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["analyst", "backend-engineer"]);

        store.delete("analyst").await.unwrap();
        assert!(matches!(
            store.get("analyst").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JobStore::new(Arc::new(FsBlobStore::new(dir.path())));

        store.save(&sample()).await.unwrap();
        let replaced = JobDescription::new("Backend Engineer", "Now with Go.", vec![]);
        store.save(&replaced).await.unwrap();

        assert_eq!(store.get("backend-engineer").await.unwrap(), replaced);
    }
}
