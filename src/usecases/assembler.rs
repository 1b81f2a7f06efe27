//! Fragment assembler. Orders items and concatenates their fragments.
//!
//! Pure: no I/O, "now" is passed in. Ordering is always re-established here
//! by an explicit sort, never assumed from the input.

use crate::domain::{CalendarEvent, FeedItem, FeedKind, NewsArticle};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::debug;

/// Emitted verbatim when no upcoming calendar events remain.
pub const NO_EVENTS_FRAGMENT: &str =
    r#"<div class="event"><p>No upcoming events are scheduled at this time. Please check back later.</p></div>"#;

/// Build the managed-region content for `kind`.
///
/// Calendar: events that ended before `now` are dropped, the rest ordered by
/// start ascending; nothing left yields `NO_EVENTS_FRAGMENT`.
/// News: every article, ordered by publication date descending (undated last).
/// Items of the other kind are ignored.
pub fn assemble<F>(
    kind: FeedKind,
    items: Vec<FeedItem>,
    now: DateTime<Utc>,
    transform: F,
) -> String
where
    F: Fn(&FeedItem) -> String,
{
    match kind {
        FeedKind::Calendar => {
            let mut events: Vec<CalendarEvent> = items
                .into_iter()
                .filter_map(|item| match item {
                    FeedItem::Calendar(event) => Some(event),
                    FeedItem::News(_) => None,
                })
                .filter(|event| event.end >= now)
                .collect();
            if events.is_empty() {
                debug!("no upcoming events, emitting placeholder");
                return NO_EVENTS_FRAGMENT.to_string();
            }
            events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
            join(events.into_iter().map(FeedItem::Calendar), &transform)
        }
        FeedKind::News => {
            let mut articles: Vec<NewsArticle> = items
                .into_iter()
                .filter_map(|item| match item {
                    FeedItem::News(article) => Some(article),
                    FeedItem::Calendar(_) => None,
                })
                .collect();
            articles.sort_by(newest_first);
            join(articles.into_iter().map(FeedItem::News), &transform)
        }
    }
}

/// Descending by date; undated after dated; ties broken by source URL so the
/// result does not depend on fetch completion order.
fn newest_first(a: &NewsArticle, b: &NewsArticle) -> Ordering {
    let by_date = match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date.then_with(|| a.source_url.cmp(&b.source_url))
}

fn join<I, F>(items: I, transform: &F) -> String
where
    I: Iterator<Item = FeedItem>,
    F: Fn(&FeedItem) -> String,
{
    items
        .map(|item| transform(&item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap()
    }

    fn event(title: &str, start_day: u32, end_day: u32) -> FeedItem {
        FeedItem::Calendar(CalendarEvent {
            title: title.into(),
            start: Los_Angeles.with_ymd_and_hms(2024, 6, start_day, 9, 0, 0).unwrap(),
            end: Los_Angeles.with_ymd_and_hms(2024, 6, end_day, 9, 0, 0).unwrap(),
        })
    }

    fn article(title: &str, day: Option<u32>) -> FeedItem {
        FeedItem::News(NewsArticle {
            title: title.into(),
            author: "a".into(),
            published_at: day.map(|d| Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()),
            body_html: String::new(),
            source_url: format!("https://example.test/{title}"),
        })
    }

    fn title_of(item: &FeedItem) -> String {
        match item {
            FeedItem::Calendar(e) => e.title.clone(),
            FeedItem::News(a) => a.title.clone(),
        }
    }

    #[test]
    fn calendar_drops_ended_events_and_sorts_ascending() {
        let items = vec![
            event("later", 20, 21),
            event("finished", 1, 1),
            event("sooner", 10, 10),
            // started in the past but still running
            event("ongoing", 1, 3),
        ];
        let out = assemble(FeedKind::Calendar, items, now(), title_of);
        assert_eq!(out, "ongoing\nsooner\nlater");
    }

    #[test]
    fn event_ending_exactly_now_is_kept() {
        let ends_now = FeedItem::Calendar(CalendarEvent {
            title: "edge".into(),
            start: now().with_timezone(&Los_Angeles),
            end: now().with_timezone(&Los_Angeles),
        });
        assert_eq!(assemble(FeedKind::Calendar, vec![ends_now], now(), title_of), "edge");
    }

    #[test]
    fn calendar_with_only_past_events_yields_placeholder() {
        let out = assemble(FeedKind::Calendar, vec![event("old", 1, 1)], now(), title_of);
        assert_eq!(out, NO_EVENTS_FRAGMENT);
    }

    #[test]
    fn news_sorted_newest_first_with_undated_last_and_nothing_filtered() {
        let items = vec![
            article("mid", Some(10)),
            article("undated", None),
            article("new", Some(20)),
            article("old", Some(1)),
        ];
        let out = assemble(FeedKind::News, items, now(), title_of);
        assert_eq!(out, "new\nmid\nold\nundated");
    }

    #[test]
    fn items_of_the_other_kind_are_ignored() {
        let items = vec![article("news", Some(1)), event("swim", 10, 10)];
        assert_eq!(assemble(FeedKind::News, items.clone(), now(), title_of), "news");
        assert_eq!(assemble(FeedKind::Calendar, items, now(), title_of), "swim");
    }
}
