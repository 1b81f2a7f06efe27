//! Application use cases. The sync pipeline stages and their orchestration.

pub mod article_fetcher;
pub mod assembler;
pub mod body_rewrite;
pub mod feed_source;
pub mod patcher;
pub mod publication;
pub mod sync_service;
pub mod transform;

pub use article_fetcher::{ArticleBatch, ArticleFetcher};
pub use assembler::{assemble, NO_EVENTS_FRAGMENT};
pub use feed_source::{FeedEndpoints, FeedSource};
pub use patcher::{locate, patch, ManagedRegion};
pub use publication::PublicationGuard;
pub use sync_service::{SyncService, SyncTargets};
pub use transform::Transformer;
