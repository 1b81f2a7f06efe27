//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Every variant that reaches
//! `SyncService::run` is fatal for the run; per-item failures never get here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    Credentials(String),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// The feed produced nothing to publish. Aborts before the document is touched.
    #[error("Empty {0} feed: nothing to publish")]
    EmptyFeed(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}
