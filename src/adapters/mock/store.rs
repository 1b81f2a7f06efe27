//! Mock DocumentStore backed by a map.

use crate::domain::DomainError;
use crate::ports::DocumentStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<PathBuf, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.docs.get_mut().insert(path.into(), content.into());
        self
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, path: &Path) -> Option<String> {
        self.docs.lock().await.get(path).cloned()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &Path) -> Result<String, DomainError> {
        self.get(path)
            .await
            .ok_or_else(|| DomainError::Storage(format!("read {}: not found", path.display())))
    }

    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Storage(format!(
                "write {}: disk full",
                path.display()
            )));
        }
        self.docs
            .lock()
            .await
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
