//! In-memory adapters for tests and `--dry-run` style experiments.
//!
//! No network, no filesystem, no git. Each records what it was asked to do.

pub mod publisher;
pub mod source;
pub mod store;

pub use publisher::RecordingPublisher;
pub use source::MockSource;
pub use store::MemoryStore;
