//! Byte storage for uploaded files.
//!
//! Services only see [`FileStorage`]; the local-disk implementation is what the
//! binary wires in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

pub const PUBLIC_PATH_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("URL is not managed by this storage: {0}")]
    ForeignUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `bytes` under a fresh key derived from `original_name`.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError>;

    /// Removes the object behind `url`. A missing object is `NotFound`, not an error.
    async fn delete(&self, url: &str) -> Result<DeleteOutcome, StorageError>;
}

/// Deletes stored bytes, logging instead of failing. Used after the database
/// side of an operation has already committed.
pub async fn remove_best_effort(storage: &dyn FileStorage, url: &str) {
    match storage.delete(url).await {
        Ok(DeleteOutcome::Deleted) => {
            tracing::debug!(url = %url, "Stored file removed");
        }
        Ok(DeleteOutcome::NotFound) => {
            tracing::warn!(url = %url, "Stored file already absent; nothing to remove");
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to remove stored file");
        }
    }
}

/// Files under a local directory, served at `<public_base_url>/uploads/<key>`.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDiskStorage {
    pub async fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}{}/{}", self.public_base_url, PUBLIC_PATH_PREFIX, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let key = url
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix(PUBLIC_PATH_PREFIX)?
            .strip_prefix('/')?;
        is_safe_key(key).then_some(key)
    }
}

#[async_trait]
impl FileStorage for LocalDiskStorage {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, StorageError> {
        let key = storage_key(original_name);
        tokio::fs::write(self.root.join(&key), bytes).await?;
        Ok(StoredFile {
            url: self.url_for(&key),
            key,
        })
    }

    async fn delete(&self, url: &str) -> Result<DeleteOutcome, StorageError> {
        let key = self
            .key_from_url(url)
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// `<uuid>.<ext>`; the user-supplied name never reaches the filesystem.
pub fn storage_key(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
