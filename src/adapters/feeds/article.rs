//! Article detail page → NewsArticle.

use super::selector;
use crate::domain::{DomainError, NewsArticle};
use chrono::{DateTime, Utc};
use scraper::Html;

pub const NO_TITLE: &str = "No Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const CONTENT_NOT_AVAILABLE: &str = "Content not available.";

/// Parse one article page. Fails only when the page has no article container;
/// missing title/author/date/body fall back to placeholders.
pub fn parse_article(html: &str, source_url: &str) -> Result<NewsArticle, DomainError> {
    let document = Html::parse_document(html);
    let item_sel = selector("div.NewsItem")?;
    let Some(item) = document.select(&item_sel).next() else {
        return Err(DomainError::Parse(format!(
            "no article container on {}",
            source_url
        )));
    };

    let text_of = |css: &str| -> Result<Option<String>, DomainError> {
        let sel = selector(css)?;
        Ok(item
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty()))
    };

    let title = text_of("h1")?.unwrap_or_else(|| NO_TITLE.to_string());
    let author = text_of("div.Author strong")?.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let date_sel = selector("span.DateStr")?;
    let published_at = item
        .select(&date_sel)
        .next()
        .and_then(|el| el.value().attr("data"))
        .and_then(parse_epoch_millis);

    let content_sel = selector("div.Content")?;
    let body_html = item
        .select(&content_sel)
        .next()
        .map(|el| el.inner_html())
        .unwrap_or_else(|| CONTENT_NOT_AVAILABLE.to_string());

    Ok(NewsArticle {
        title,
        author,
        published_at,
        body_html,
        source_url: source_url.to_string(),
    })
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis = raw.trim().parse::<i64>().ok()?;
    DateTime::<Utc>::from_timestamp_millis(millis)
}
