//! Remote source stage: fetch one feed and normalize it.
//!
//! Calendar: one ICS request → events in the target zone, sorted by start.
//! News: one listing request → article URLs (supplements excluded); bodies
//! are left to the article fetcher. Any failure here is fatal for the run.

use crate::adapters::feeds::{article_urls, parse_events};
use crate::domain::{DomainError, FeedKind, FetchedFeed};
use crate::ports::ContentSource;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug, Clone)]
pub struct FeedEndpoints {
    pub calendar_url: String,
    pub news_url: String,
    /// Base for relative listing links.
    pub origin: Url,
    pub tz: Tz,
}

pub struct FeedSource {
    source: Arc<dyn ContentSource>,
    endpoints: FeedEndpoints,
}

impl FeedSource {
    pub fn new(source: Arc<dyn ContentSource>, endpoints: FeedEndpoints) -> Self {
        Self { source, endpoints }
    }

    pub async fn fetch(
        &self,
        kind: FeedKind,
        now: DateTime<Utc>,
    ) -> Result<FetchedFeed, DomainError> {
        match kind {
            FeedKind::Calendar => {
                let url = &self.endpoints.calendar_url;
                let payload = self.source.fetch_text(url).await?;
                let events = parse_events(&payload, self.endpoints.tz, now)?;
                info!(count = events.len(), tz = %self.endpoints.tz, "parsed calendar feed");
                Ok(FetchedFeed::Events(events))
            }
            FeedKind::News => {
                let url = &self.endpoints.news_url;
                let listing = self.source.fetch_text(url).await?;
                let urls = article_urls(&listing, &self.endpoints.origin)?;
                Ok(FetchedFeed::ArticleUrls(urls))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockSource;
    use chrono::TimeZone;

    const CAL: &str = "https://feeds.test/Events.ics";
    const NEWS: &str = "https://www.gomotionapp.com/team/cadas/page/news";

    fn feed(source: MockSource) -> FeedSource {
        FeedSource::new(
            Arc::new(source),
            FeedEndpoints {
                calendar_url: CAL.into(),
                news_url: NEWS.into(),
                origin: Url::parse("https://www.gomotionapp.com").unwrap(),
                tz: chrono_tz::America::Los_Angeles,
            },
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn calendar_events_come_back_sorted() {
        let ics = [
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "BEGIN:VEVENT",
            "UID:2",
            "SUMMARY:Second",
            "DTSTART:20240620T160000Z",
            "END:VEVENT",
            "BEGIN:VEVENT",
            "UID:1",
            "SUMMARY:First",
            "DTSTART:20240610T160000Z",
            "END:VEVENT",
            "END:VCALENDAR",
        ]
        .join("\r\n");
        let source = feed(MockSource::new().with_page(CAL, ics));

        let FetchedFeed::Events(events) = source.fetch(FeedKind::Calendar, now()).await.unwrap()
        else {
            panic!("expected events");
        };
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
    }

    #[tokio::test]
    async fn news_listing_yields_urls_without_fetching_articles() {
        let listing = r#"<div class="Item"><a href="/news/1">1</a></div>
                         <div class="Item Supplement"><a href="/promo">p</a></div>"#;
        let mock = Arc::new(MockSource::new().with_page(NEWS, listing));
        let source = FeedSource::new(
            mock.clone(),
            FeedEndpoints {
                calendar_url: CAL.into(),
                news_url: NEWS.into(),
                origin: Url::parse("https://www.gomotionapp.com").unwrap(),
                tz: chrono_tz::UTC,
            },
        );

        let fetched = source.fetch(FeedKind::News, now()).await.unwrap();
        assert_eq!(
            fetched,
            FetchedFeed::ArticleUrls(vec!["https://www.gomotionapp.com/news/1".into()])
        );
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn unreachable_feed_is_fatal() {
        let source = feed(MockSource::new().with_failure(CAL, "connection refused"));
        let err = source.fetch(FeedKind::Calendar, now()).await.unwrap_err();
        assert!(matches!(err, DomainError::Fetch { .. }));
    }
}
