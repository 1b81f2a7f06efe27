//! Core domain layer. No external I/O dependencies.
//!
//! Entities and errors live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    CalendarEvent, FeedItem, FeedKind, FetchedFeed, NewsArticle, PatchResult, RunOutcome,
};
pub use errors::DomainError;
