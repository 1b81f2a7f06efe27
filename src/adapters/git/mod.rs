//! Version-control adapter. Implements Publisher by driving the `git` binary.

pub mod publisher;

pub use publisher::{GitPublisher, GitSettings};
