//! Infrastructure adapters. Implement outbound ports.
//!
//! HTTP, feed parsers, filesystem, git. Map errors to DomainError.

pub mod feeds;
pub mod git;
pub mod http;
pub mod mock;
pub mod persistence;
