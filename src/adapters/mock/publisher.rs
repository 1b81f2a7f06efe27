//! Mock Publisher. Records publish calls instead of talking to a remote.

use crate::domain::DomainError;
use crate::ports::Publisher;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(Vec<PathBuf>, String)>>,
    fail: AtomicBool,
    pending: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make publish fail (e.g. push rejected). A failed publish leaves work pending.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Simulate unpublished local changes left by an earlier run.
    pub fn set_pending(&self, pending: bool) {
        self.pending.store(pending, Ordering::SeqCst);
    }

    /// Every successful publish: (paths, commit message).
    pub async fn published(&self) -> Vec<(Vec<PathBuf>, String)> {
        self.published.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    async fn has_pending(&self, _path: &Path) -> Result<bool, DomainError> {
        Ok(self.pending.load(Ordering::SeqCst))
    }

    async fn publish(&self, paths: &[PathBuf], message: &str) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            self.pending.store(true, Ordering::SeqCst);
            return Err(DomainError::Publish("push rejected by remote".to_string()));
        }
        self.published
            .lock()
            .await
            .push((paths.to_vec(), message.to_string()));
        self.pending.store(false, Ordering::SeqCst);
        Ok(())
    }
}
