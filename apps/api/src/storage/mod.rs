//! Pluggable key/value storage for uploaded resumes and job descriptions.
//!
//! Keys are flat names (`jane_roe.pdf`, `backend-engineer.txt`). Anything that
//! could address outside the store is rejected before reaching a backend.

pub mod fs;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use fs::FsBlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No entry named '{0}'")]
    NotFound(String),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Carried in `AppState` as `Arc<dyn BlobStore>`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Full overwrite; there is no partial update.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Keys in lexical order.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Rejects empty keys, path separators, parent references and hidden names.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.trim().is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.starts_with('.')
        || key.chars().any(char::is_control);

    if invalid {
        Err(StorageError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}
