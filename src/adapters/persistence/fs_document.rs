//! Implements DocumentStore on the local filesystem.
//!
//! Writes go through a temp file + rename so the target is never half-written.

use crate::domain::DomainError;
use crate::ports::DocumentStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Default, Clone, Copy)]
pub struct FsDocumentStore;

impl FsDocumentStore {
    pub fn new() -> Self {
        Self
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl DocumentStore for FsDocumentStore {
    async fn read(&self, path: &Path) -> Result<String, DomainError> {
        fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Storage(format!("read {}: {}", path.display(), e)))
    }

    /// 1. Write to temp file next to the target
    /// 2. sync_all() so data is on disk before the rename
    /// 3. Rename over the target
    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        let temp_path = Self::temp_path(path);
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(content.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| DomainError::Storage(format!("rename into {}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_replaces_content_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.html");
        tokio::fs::write(&path, "old").await.unwrap();

        let store = FsDocumentStore::new();
        store.write(&path, "new content").await.unwrap();

        assert_eq!(store.read(&path).await.unwrap(), "new content");
        assert!(!FsDocumentStore::temp_path(&path).exists());
    }

    #[tokio::test]
    async fn reading_a_missing_document_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsDocumentStore::new()
            .read(&dir.path().join("missing.html"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
