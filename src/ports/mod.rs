//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the pipeline calls into infrastructure (HTTP, filesystem, git).

pub mod outbound;

pub use outbound::{ContentSource, DocumentStore, Publisher};
