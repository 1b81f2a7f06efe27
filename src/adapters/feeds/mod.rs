//! Feed parsers. Turn fetched payloads (ICS text, platform HTML) into domain values.
//!
//! Everything here is synchronous and pure: the HTTP adapter fetches, these parse.

pub mod article;
pub mod ics;
pub mod listing;

pub use article::parse_article;
pub use ics::parse_events;
pub use listing::article_urls;

use crate::domain::DomainError;
use scraper::Selector;

/// Compile a CSS selector, mapping failures into the domain.
pub(crate) fn selector(css: &str) -> Result<Selector, DomainError> {
    Selector::parse(css).map_err(|e| DomainError::Parse(format!("selector '{}': {}", css, e)))
}
