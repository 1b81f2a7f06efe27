//! Content transformer: one FeedItem → one self-contained markup fragment.
//!
//! Calendar events are rendered from structured fields only. News bodies go
//! through `body_rewrite`; if that fails the original body is passed through
//! untouched rather than dropping the article.

use crate::domain::{CalendarEvent, FeedItem, NewsArticle};
use crate::usecases::body_rewrite::rewrite_body;
use chrono_tz::Tz;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;
use url::Url;

/// Display format for every date in the emitted markup.
pub const DATE_FORMAT: &str = "%B %d, %Y";
pub const UNKNOWN_DATE: &str = "Unknown Date";

pub struct Transformer {
    tz: Tz,
    origin: Url,
    calendar_details_url: String,
}

impl Transformer {
    /// * `tz` - zone dates are displayed in
    /// * `origin` - base for relative links and images in article bodies
    /// * `calendar_details_url` - target of the per-event "More Details" button
    pub fn new(tz: Tz, origin: Url, calendar_details_url: String) -> Self {
        Self {
            tz,
            origin,
            calendar_details_url,
        }
    }

    pub fn transform(&self, item: &FeedItem) -> String {
        match item {
            FeedItem::Calendar(event) => self.event_fragment(event),
            FeedItem::News(article) => self.article_fragment(article),
        }
    }

    fn event_fragment(&self, event: &CalendarEvent) -> String {
        let start = event.start.with_timezone(&self.tz).format(DATE_FORMAT);
        let end = event.end.with_timezone(&self.tz).format(DATE_FORMAT);
        format!(
            r#"<div class="event">
  <h2><strong>{title}</strong></h2>
  <p><b>Event Start:</b> {start}</p>
  <p><b>Event End:</b> {end}</p>
  <br>
  <p>Click the button below for more information.</p>
  <a href="{details}" target="_blank" rel="noopener noreferrer" class="btn btn-primary">More Details</a>
</div>
<br><br>"#,
            title = encode_text(&event.title),
            details = encode_double_quoted_attribute(&self.calendar_details_url),
        )
    }

    fn article_fragment(&self, article: &NewsArticle) -> String {
        let published = article
            .published_at
            .map(|at| at.with_timezone(&self.tz).format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string());

        let body = match rewrite_body(&article.body_html, &self.origin) {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %article.source_url, error = %e, "body rewrite failed, passing content through");
                article.body_html.clone()
            }
        };

        format!(
            r#"<div class="news-item">
  <h2 class="news-title"><strong>{title}</strong></h2>
  <p class="news-date">Author: {author}</p>
  <p class="news-date">Published on {published}</p>
  <div class="news-content">{body}</div>
</div>"#,
            title = encode_text(&article.title),
            author = encode_text(&article.author),
            published = encode_text(&published),
        )
    }
}
