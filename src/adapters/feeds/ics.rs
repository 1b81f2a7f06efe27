//! ICS payload → calendar events in one fixed time zone.

use crate::domain::{CalendarEvent, DomainError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, EventLike,
};
use tracing::{debug, warn};

/// How far back and forward from "now" events are kept.
const WINDOW_DAYS: i64 = 365;

/// Parse an ICS payload into events converted to `tz`, sorted by start ascending.
///
/// Events without a start are skipped. A missing (or inverted) DTEND is taken
/// from DURATION, else the next local midnight for all-day events, else the
/// start itself. Events entirely outside `now ± 1 year` are dropped.
pub fn parse_events(
    ics: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Vec<CalendarEvent>, DomainError> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| DomainError::Parse(format!("ICS: {}", e)))?;

    let window_start = now - Duration::days(WINDOW_DAYS);
    let window_end = now + Duration::days(WINDOW_DAYS);

    let mut events = Vec::new();
    for component in &calendar.components {
        let CalendarComponent::Event(event) = component else {
            continue;
        };
        let title = event
            .get_summary()
            .unwrap_or("Untitled Event")
            .trim()
            .to_string();

        let Some(raw_start) = event.get_start() else {
            warn!(title = %title, "event has no DTSTART, skipping");
            continue;
        };
        let all_day = match &raw_start {
            DatePerhapsTime::Date(date) => Some(*date),
            DatePerhapsTime::DateTime(_) => None,
        };
        let Some(start) = to_zone(raw_start, tz) else {
            warn!(title = %title, "event has no usable DTSTART, skipping");
            continue;
        };
        let end = event
            .get_end()
            .and_then(|d| to_zone(d, tz))
            .filter(|end| *end >= start)
            .or_else(|| {
                let raw = event.property_value("DURATION")?;
                let Some(duration) = parse_duration(raw) else {
                    warn!(title = %title, duration = raw, "unparsable DURATION, ignoring");
                    return None;
                };
                start.checked_add_signed(duration).filter(|end| *end >= start)
            })
            .or_else(|| all_day.and_then(|date| local_midnight(date.succ_opt()?, tz)))
            .unwrap_or(start);

        if end < window_start || start > window_end {
            debug!(title = %title, "event outside window, skipping");
            continue;
        }

        events.push(CalendarEvent { title, start, end });
    }

    events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
    Ok(events)
}

/// Convert any ICS date form into `tz`.
fn to_zone(value: DatePerhapsTime, tz: Tz) -> Option<DateTime<Tz>> {
    match value {
        DatePerhapsTime::Date(date) => local_midnight(date, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)) => Some(utc.with_timezone(&tz)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => localize(naive, tz),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let source_tz = tzid.parse::<Tz>().unwrap_or_else(|_| {
                warn!(tzid = %tzid, "unknown TZID, assuming target zone");
                tz
            });
            localize(date_time, source_tz).map(|dt| dt.with_timezone(&tz))
        }
    }
}

/// Parse an RFC 5545 duration (`P1D`, `PT4H30M`, `P2W`, `-PT15M`).
///
/// Days are taken as 24 hours.
fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (negative, rest) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut digits = String::new();
    let mut parts = 0;
    for ch in rest.chars() {
        match ch {
            '0'..='9' => digits.push(ch),
            'T' if !in_time && digits.is_empty() => in_time = true,
            unit => {
                let n: i64 = digits.parse().ok()?;
                digits.clear();
                let part = match (unit, in_time) {
                    ('W', false) => Duration::try_weeks(n)?,
                    ('D', false) => Duration::try_days(n)?,
                    ('H', true) => Duration::try_hours(n)?,
                    ('M', true) => Duration::try_minutes(n)?,
                    ('S', true) => Duration::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
                parts += 1;
            }
        }
    }
    if !digits.is_empty() || parts == 0 {
        return None;
    }
    Some(if negative { -total } else { total })
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    localize(date.and_hms_opt(0, 0, 0)?, tz)
}

/// Resolve a wall-clock time in `tz`. Ambiguous times take the earlier instant;
/// times inside a DST gap are shifted forward by an hour.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    fn ics(events: &[&str]) -> String {
        let mut lines = vec!["BEGIN:VCALENDAR", "VERSION:2.0", "PRODID:-//test//EN"];
        lines.extend_from_slice(events);
        lines.push("END:VCALENDAR");
        lines.join("\r\n") + "\r\n"
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn converts_utc_and_tzid_into_target_zone_and_sorts() {
        let payload = ics(&[
            "BEGIN:VEVENT",
            "UID:b",
            "SUMMARY:Championships",
            "DTSTART;TZID=America/New_York:20240710T090000",
            "DTEND;TZID=America/New_York:20240710T170000",
            "END:VEVENT",
            "BEGIN:VEVENT",
            "UID:a",
            "SUMMARY:Time Trials",
            "DTSTART:20240615T160000Z",
            "DTEND:20240615T200000Z",
            "END:VEVENT",
        ]);

        let events = parse_events(&payload, Los_Angeles, now()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Time Trials");
        assert_eq!(events[0].start.to_rfc3339(), "2024-06-15T09:00:00-07:00");
        assert_eq!(events[1].title, "Championships");
        assert_eq!(events[1].start.to_rfc3339(), "2024-07-10T06:00:00-07:00");
        assert!(events.iter().all(|e| e.start.timezone() == Los_Angeles));
    }

    #[test]
    fn all_day_event_without_end_lasts_until_next_midnight() {
        let payload = ics(&[
            "BEGIN:VEVENT",
            "UID:c",
            "SUMMARY:Team Picnic",
            "DTSTART;VALUE=DATE:20240601",
            "END:VEVENT",
        ]);

        let events = parse_events(&payload, Los_Angeles, now()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.to_rfc3339(), "2024-06-01T00:00:00-07:00");
        assert_eq!(events[0].end.to_rfc3339(), "2024-06-02T00:00:00-07:00");
        // still running at 05:00 local on its own day
        assert!(events[0].end >= now());
    }

    #[test]
    fn duration_supplies_the_missing_end() {
        let payload = ics(&[
            "BEGIN:VEVENT",
            "UID:d",
            "SUMMARY:Dual Meet",
            "DTSTART:20240601T110000Z",
            "DURATION:PT4H30M",
            "END:VEVENT",
        ]);

        let events = parse_events(&payload, Los_Angeles, now()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.to_rfc3339(), "2024-06-01T04:00:00-07:00");
        assert_eq!(events[0].end.to_rfc3339(), "2024-06-01T08:30:00-07:00");
        assert!(events[0].end >= now());
    }

    #[test]
    fn timed_event_without_end_or_duration_ends_at_start() {
        let payload = ics(&[
            "BEGIN:VEVENT",
            "UID:e",
            "SUMMARY:Deadline",
            "DTSTART:20240610T170000Z",
            "END:VEVENT",
        ]);

        let events = parse_events(&payload, Los_Angeles, now()).unwrap();
        assert_eq!(events[0].end, events[0].start);
    }

    #[test]
    fn parses_duration_forms() {
        assert_eq!(parse_duration("P1D"), Some(Duration::days(1)));
        assert_eq!(parse_duration("P2W"), Some(Duration::weeks(2)));
        assert_eq!(
            parse_duration("P1DT2H15M"),
            Some(Duration::days(1) + Duration::hours(2) + Duration::minutes(15))
        );
        assert_eq!(parse_duration("-PT15M"), Some(-Duration::minutes(15)));
        assert_eq!(parse_duration("PT"), None);
        assert_eq!(parse_duration("P4H"), None);
        assert_eq!(parse_duration("1H"), None);
    }

    #[test]
    fn drops_events_outside_the_window() {
        let payload = ics(&[
            "BEGIN:VEVENT",
            "UID:old",
            "SUMMARY:Ancient Meet",
            "DTSTART:20200101T100000Z",
            "DTEND:20200101T120000Z",
            "END:VEVENT",
        ]);

        let events = parse_events(&payload, Los_Angeles, now()).unwrap();
        assert!(events.is_empty());
    }
}
