//! Event domain models

use crate::error::{EventError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime};
use database::mongodb::StoredDocument;
use mongodb::bson::{self, Bson};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use utoipa::ToSchema;

/// Format used to parse submitted times and to render them by default
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a timestamp in [`DEFAULT_DATETIME_FORMAT`]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DEFAULT_DATETIME_FORMAT).ok()
}

/// A calendar event
///
/// `id` is the natural key; `time` is a wall-clock timestamp without timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: i64,
    pub description: Option<String>,
    #[schema(value_type = String, example = "2024-01-01T00:00:00")]
    pub time: NaiveDateTime,
}

impl Event {
    pub fn new(id: i64, description: Option<String>, time: NaiveDateTime) -> Self {
        Self {
            id,
            description,
            time,
        }
    }

    /// Build an event from one item of a create request
    ///
    /// `id` must be a JSON integer and `time` a string in
    /// [`DEFAULT_DATETIME_FORMAT`]. A missing `description` becomes the empty
    /// string while an explicit `null` stays absent.
    pub fn from_json(item: &Value) -> Result<Self> {
        let id = item
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| EventError::missing_key("id"))?;

        let time = item
            .get("time")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
            .ok_or_else(|| EventError::missing_key("time"))?;

        let description = match item.get("description") {
            None => Some(String::new()),
            Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(EventError::missing_key("description")),
        };

        Ok(Self::new(id, description, time))
    }

    /// Render the event with `time` formatted by a strftime-style pattern
    ///
    /// An absent or empty pattern falls back to [`DEFAULT_DATETIME_FORMAT`].
    pub fn format_time(&self, pattern: Option<&str>) -> Result<FormattedEvent> {
        let pattern = pattern
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_DATETIME_FORMAT);

        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(EventError::invalid_datetime_format(pattern));
        }

        // Specifiers needing an offset (e.g. %z) fail at render time on naive values
        let mut time = String::new();
        write!(time, "{}", self.time.format_with_items(items.into_iter()))
            .map_err(|_| EventError::invalid_datetime_format(pattern))?;

        Ok(FormattedEvent {
            id: self.id,
            description: self.description.clone(),
            time,
        })
    }
}

/// Event as returned to clients, with `time` already rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormattedEvent {
    pub id: i64,
    pub description: Option<String>,
    #[schema(example = "2024-01-01T00:00:00")]
    pub time: String,
}

/// Persisted shape of an event
///
/// `_id` always equals `id`. `time` keeps the event's wall-clock value as a
/// BSON UTC datetime so that range queries compare natively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(rename = "_id")]
    pub document_id: i64,
    pub id: i64,
    pub description: Option<String>,
    pub time: bson::DateTime,
}

impl StoredDocument for EventDocument {
    fn document_id(&self) -> Bson {
        Bson::Int64(self.document_id)
    }
}

/// Convert a naive timestamp to a BSON datetime with the same wall-clock value
pub fn to_bson_datetime(time: NaiveDateTime) -> bson::DateTime {
    bson::DateTime::from_millis(time.and_utc().timestamp_millis())
}

impl From<Event> for EventDocument {
    fn from(event: Event) -> Self {
        Self {
            document_id: event.id,
            id: event.id,
            description: event.description,
            time: to_bson_datetime(event.time),
        }
    }
}

impl TryFrom<EventDocument> for Event {
    type Error = EventError;

    fn try_from(document: EventDocument) -> Result<Self> {
        let millis = document.time.timestamp_millis();
        let time = DateTime::from_timestamp_millis(millis)
            .map(|t| t.naive_utc())
            .ok_or_else(|| {
                EventError::Internal(format!(
                    "Stored event {} has an out-of-range time ({} ms)",
                    document.id, millis
                ))
            })?;

        Ok(Self::new(document.id, document.description, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jan_4() -> NaiveDateTime {
        parse_timestamp("2024-01-04T00:00:00").unwrap()
    }

    #[test]
    fn test_from_json_valid() {
        let event = Event::from_json(&json!({
            "id": 1,
            "description": "standup",
            "time": "2024-01-04T00:00:00"
        }))
        .unwrap();

        assert_eq!(event, Event::new(1, Some("standup".into()), jan_4()));
    }

    #[test]
    fn test_from_json_missing_description_defaults_to_empty() {
        let event = Event::from_json(&json!({ "id": 2, "time": "2024-01-04T00:00:00" })).unwrap();
        assert_eq!(event.description.as_deref(), Some(""));

        let event = Event::from_json(&json!({
            "id": 2,
            "description": null,
            "time": "2024-01-04T00:00:00"
        }))
        .unwrap();
        assert!(event.description.is_none());
    }

    #[test]
    fn test_from_json_missing_id() {
        let err = Event::from_json(&json!({ "invalid": "record" })).unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));
        assert!(err.to_string().ends_with("'id'"));
    }

    #[test]
    fn test_from_json_rejects_non_integer_id() {
        for id in [json!("1"), json!(1.5), json!(null)] {
            let err = Event::from_json(&json!({ "id": id, "time": "2024-01-04T00:00:00" }))
                .unwrap_err();
            assert!(err.to_string().ends_with("'id'"));
        }
    }

    #[test]
    fn test_from_json_rejects_bad_time() {
        for time in [json!("04/01/2024"), json!(12), json!("2024-01-04")] {
            let err = Event::from_json(&json!({ "id": 1, "time": time })).unwrap_err();
            assert!(matches!(err, EventError::Validation(_)));
            assert!(err.to_string().ends_with("'time'"));
        }
    }

    #[test]
    fn test_format_time_default() {
        let event = Event::new(1, None, jan_4());

        assert_eq!(event.format_time(None).unwrap().time, "2024-01-04T00:00:00");
        assert_eq!(event.format_time(Some("")).unwrap().time, "2024-01-04T00:00:00");
    }

    #[test]
    fn test_format_time_custom_patterns() {
        let event = Event::new(1, Some("x".into()), jan_4());

        let formatted = event.format_time(Some("%Y-%m-%d %H:%M:%S")).unwrap();
        assert_eq!(formatted.time, "2024-01-04 00:00:00");
        assert_eq!(formatted.description.as_deref(), Some("x"));

        assert_eq!(event.format_time(Some("%I %p %S")).unwrap().time, "12 AM 00");
    }

    #[test]
    fn test_format_time_invalid_pattern() {
        let event = Event::new(1, None, jan_4());

        let err = event.format_time(Some("%Q")).unwrap_err();
        assert!(matches!(err, EventError::InvalidFormat(_)));
        assert_eq!(
            err.to_string(),
            "Error formatting retrieved record with the specified datetime_format: %Q"
        );

        // Needs an offset the naive time does not have
        assert!(matches!(
            event.format_time(Some("%Y %z")),
            Err(EventError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_document_conversion_keeps_wall_clock() {
        let event = Event::new(7, Some("review".into()), parse_timestamp("2024-01-15T13:45:10").unwrap());
        let document = EventDocument::from(event.clone());

        assert_eq!(document.document_id, 7);
        assert_eq!(document.document_id(), Bson::Int64(7));
        assert_eq!(
            document.time.timestamp_millis(),
            event.time.and_utc().timestamp_millis()
        );

        let back = Event::try_from(document).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_document_serializes_with_native_datetime() {
        let document = EventDocument::from(Event::new(3, None, jan_4()));
        let raw = bson::to_document(&document).unwrap();

        assert_eq!(raw.get_i64("_id").unwrap(), 3);
        assert_eq!(raw.get_i64("id").unwrap(), 3);
        assert!(raw.get_datetime("time").is_ok());
        assert_eq!(raw.get("description"), Some(&Bson::Null));
    }
}
