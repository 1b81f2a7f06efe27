//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::DomainError;
use std::path::{Path, PathBuf};

/// Remote content capability. Plain HTTP GET returning the body as text.
///
/// Both the ICS payload and the HTML pages go through here; parsing is done
/// afterwards by pure functions, so parsed trees never cross an await point.
#[async_trait::async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    /// `DomainError::Fetch` on transport failure or a non-success status.
    async fn fetch_text(&self, url: &str) -> Result<String, DomainError>;
}

/// Target document storage.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the whole document as UTF-8.
    async fn read(&self, path: &Path) -> Result<String, DomainError>;

    /// Replace the document with `content`. Must not leave a partial file behind.
    async fn write(&self, path: &Path, content: &str) -> Result<(), DomainError>;
}

/// Version-control publish capability (stage, commit, push as one unit).
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// True when `path` has changes that have not reached the remote yet
    /// (uncommitted edits or local commits ahead of upstream).
    async fn has_pending(&self, path: &Path) -> Result<bool, DomainError>;

    /// Stage `paths`, commit them with `message` and push.
    async fn publish(&self, paths: &[PathBuf], message: &str) -> Result<(), DomainError>;
}
