//! Domain entities. Pure data structures for the sync pipeline.
//!
//! No HTTP, HTML or git types here. Adapters map into these.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;

/// Which remote feed a pipeline run synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Calendar,
    News,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Calendar => "calendar",
            FeedKind::News => "news",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single calendar entry. Both timestamps are already in the target zone.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// A fully fetched news article.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub author: String,
    /// `None` when the page carried no usable date; such articles sort last.
    pub published_at: Option<DateTime<Utc>>,
    /// Raw inner HTML of the article body, as published upstream.
    pub body_html: String,
    pub source_url: String,
}

/// One item of either feed. Dispatched explicitly at the transform boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedItem {
    Calendar(CalendarEvent),
    News(NewsArticle),
}

impl From<CalendarEvent> for FeedItem {
    fn from(event: CalendarEvent) -> Self {
        FeedItem::Calendar(event)
    }
}

impl From<NewsArticle> for FeedItem {
    fn from(article: NewsArticle) -> Self {
        FeedItem::News(article)
    }
}

/// Output of the remote source stage.
///
/// The calendar feed is complete after one request; the news listing only
/// yields article URLs for the concurrent fetcher to expand.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedFeed {
    Events(Vec<CalendarEvent>),
    ArticleUrls(Vec<String>),
}

/// Result of patching a document. Value type; the caller decides what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub changed: bool,
    pub new_content: String,
}

/// How a single pipeline run ended (successful cases only; aborts are errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Managed region already up to date; nothing persisted or published.
    Unchanged,
    /// Document rewritten and published.
    Published,
    /// Document unchanged locally, but an earlier run left unpublished changes.
    PublishRetried,
    /// `--dry-run`: nothing persisted or published.
    DryRun { changed: bool },
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Unchanged => "unchanged",
            RunOutcome::Published => "published",
            RunOutcome::PublishRetried => "publish-retried",
            RunOutcome::DryRun { .. } => "dry-run",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
