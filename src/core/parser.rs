//! JSON parser for event list files.
//!
//! Two layouts are accepted: a bare array of events, or a versioned document
//! `{ "version": 1, "events": [...] }`. Each event needs an `id` (string or
//! number) and a `date` (or `eventDate`) given as `YYYY-MM-DD` or as an
//! RFC 3339 timestamp, which is reduced to its UTC calendar day.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::days::EventRecord;

/// Document version understood by this parser.
pub const SUPPORTED_VERSION: u32 = 1;

/// Errors that can occur while parsing an event file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax error or a value of the wrong shape
    #[error("Invalid JSON syntax: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    /// An event lacks a required field
    #[error("Event #{position} is missing required field: {field}")]
    MissingField {
        field: &'static str,
        /// 1-based position of the event in the file
        position: usize,
    },

    /// Unsupported document version
    #[error("Unsupported format version {version}: expected version 1")]
    UnsupportedVersion { version: u32 },
}

/// Result of parsing an event file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEvents {
    /// Events in file order
    pub events: Vec<EventRecord>,
    /// Records dropped for an unreadable date or a duplicate id
    pub skipped: usize,
}

// ============================================================================
// Intermediate JSON structures for deserialization
// ============================================================================

/// Versioned document layout.
#[derive(Debug, Deserialize)]
struct JsonEventFile {
    version: u32,
    #[serde(default)]
    events: Vec<JsonEvent>,
}

/// Event ids may be written as strings or numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonId {
    Text(String),
    Number(serde_json::Number),
}

impl JsonId {
    fn into_string(self) -> String {
        match self {
            JsonId::Text(text) => text,
            JsonId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonEvent {
    #[serde(default)]
    id: Option<JsonId>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, rename = "eventDate")]
    event_date: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

// ============================================================================
// Parser implementation
// ============================================================================

/// Parse the contents of an event file.
///
/// Events with a date that cannot be read are skipped with a warning, as are
/// later duplicates of an id already seen.
pub fn parse_events(content: &str) -> Result<ParsedEvents, ParseError> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    let records: Vec<JsonEvent> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        let file: JsonEventFile = serde_json::from_value(value)?;
        if file.version != SUPPORTED_VERSION {
            return Err(ParseError::UnsupportedVersion {
                version: file.version,
            });
        }
        file.events
    };

    let mut parsed = ParsedEvents::default();
    let mut seen_ids = HashSet::new();

    for (i, record) in records.into_iter().enumerate() {
        let position = i + 1;
        let id = record
            .id
            .map(JsonId::into_string)
            .ok_or(ParseError::MissingField {
                field: "id",
                position,
            })?;
        let raw_date = record
            .date
            .or(record.event_date)
            .ok_or(ParseError::MissingField {
                field: "date",
                position,
            })?;

        let Some(date) = parse_event_date(&raw_date) else {
            log::warn!("Skipping event {} with unreadable date '{}'", id, raw_date);
            parsed.skipped += 1;
            continue;
        };

        if !seen_ids.insert(id.clone()) {
            log::warn!("Skipping duplicate event id {}", id);
            parsed.skipped += 1;
            continue;
        }

        parsed.events.push(EventRecord {
            location: record.location,
            title: record.title,
            ..EventRecord::new(id, date)
        });
    }

    log::debug!(
        "Parsed {} events ({} skipped)",
        parsed.events.len(),
        parsed.skipped
    );
    Ok(parsed)
}

/// Calendar day of an event date string.
fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    // Timestamps without an offset are taken as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_event_date_formats() {
        assert_eq!(parse_event_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_event_date(" 2024-03-05 "), Some(date(2024, 3, 5)));
        assert_eq!(
            parse_event_date("2024-03-05T10:30:00Z"),
            Some(date(2024, 3, 5))
        );
        // 23:30 at -05:00 is already the next day in UTC
        assert_eq!(
            parse_event_date("2024-03-05T23:30:00-05:00"),
            Some(date(2024, 3, 6))
        );
        assert_eq!(
            parse_event_date("2024-03-05T08:00:00.000"),
            Some(date(2024, 3, 5))
        );
        assert_eq!(parse_event_date("2024-02-30"), None);
        assert_eq!(parse_event_date("next tuesday"), None);
    }

    #[test]
    fn test_parse_bare_array() {
        let json = r#"[
            {"id": "kickoff", "date": "2024-01-15", "title": "Kickoff", "location": "Hall A"},
            {"id": 42, "eventDate": "2024-02-01T09:00:00Z"}
        ]"#;

        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.events.len(), 2);

        let first = &parsed.events[0];
        assert_eq!(first.id, "kickoff");
        assert_eq!(first.date, date(2024, 1, 15));
        assert_eq!(first.title.as_deref(), Some("Kickoff"));
        assert_eq!(first.location.as_deref(), Some("Hall A"));

        assert_eq!(parsed.events[1].id, "42");
        assert_eq!(parsed.events[1].date, date(2024, 2, 1));
    }

    #[test]
    fn test_parse_versioned_document() {
        let json = r#"{
            "version": 1,
            "events": [{"id": "a", "date": "2025-06-01"}]
        }"#;

        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.events, vec![EventRecord::new("a", date(2025, 6, 1))]);
    }

    #[test]
    fn test_parse_versioned_document_without_events() {
        let parsed = parse_events(r#"{"version": 1}"#).unwrap();
        assert!(parsed.events.is_empty());
    }

    #[test]
    fn test_parse_unsupported_version() {
        let json = r#"{"version": 2, "events": []}"#;
        match parse_events(json) {
            Err(ParseError::UnsupportedVersion { version }) => assert_eq!(version, 2),
            other => panic!("Expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_syntax() {
        let result = parse_events("[{\"id\": \"a\", }");
        assert!(matches!(result, Err(ParseError::JsonSyntax(_))));
    }

    #[test]
    fn test_parse_missing_id() {
        let json = r#"[{"id": "a", "date": "2024-01-01"}, {"date": "2024-01-02"}]"#;
        match parse_events(json) {
            Err(ParseError::MissingField { field, position }) => {
                assert_eq!(field, "id");
                assert_eq!(position, 2);
            }
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_date() {
        let json = r#"[{"id": "a"}]"#;
        let error = parse_events(json).unwrap_err();
        assert_eq!(error.to_string(), "Event #1 is missing required field: date");
    }

    #[test]
    fn test_unreadable_dates_are_skipped() {
        let json = r#"[
            {"id": "ok", "date": "2024-05-01"},
            {"id": "bad", "date": "not a date"},
            {"id": "also-ok", "eventDate": "2024-05-03"}
        ]"#;

        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.skipped, 1);
        let ids: Vec<&str> = parsed.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "also-ok"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let json = r#"[
            {"id": "x", "date": "2024-05-01"},
            {"id": "x", "date": "2024-06-01"}
        ]"#;

        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.events, vec![EventRecord::new("x", date(2024, 5, 1))]);
    }

    #[test]
    fn test_date_takes_precedence_over_event_date() {
        let json = r#"[{"id": "x", "date": "2024-05-01", "eventDate": "2024-09-09"}]"#;
        let parsed = parse_events(json).unwrap();
        assert_eq!(parsed.events[0].date, date(2024, 5, 1));
    }
}
