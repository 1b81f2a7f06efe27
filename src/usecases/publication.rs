//! Publication guard. Persists and publishes only real changes.

use crate::domain::{DomainError, PatchResult};
use crate::ports::{DocumentStore, Publisher};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct PublicationGuard {
    store: Arc<dyn DocumentStore>,
    publisher: Arc<dyn Publisher>,
}

impl PublicationGuard {
    pub fn new(store: Arc<dyn DocumentStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    /// Returns `Ok(true)` when the change was persisted and published,
    /// `Ok(false)` when there was nothing to do.
    ///
    /// A persist failure aborts before publish. A publish failure is returned
    /// as-is and the persisted document stays in place, so the next run sees
    /// no diff and only has to retry the publish.
    pub async fn maybe_publish(
        &self,
        path: &Path,
        result: &PatchResult,
        message: &str,
    ) -> Result<bool, DomainError> {
        if !result.changed {
            info!(path = %path.display(), "document unchanged, skipping publish");
            return Ok(false);
        }

        self.store.write(path, &result.new_content).await?;
        self.publisher
            .publish(&[path.to_path_buf()], message)
            .await?;
        Ok(true)
    }
}
