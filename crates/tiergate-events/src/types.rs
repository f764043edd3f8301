//! Event records
//!
//! Events are created and maintained by the data store; this crate only
//! reads them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tiergate_tiers::Tier;

/// A listable event gated by a tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Event ID
    pub id: String,

    /// Title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// When the event takes place
    #[serde(deserialize_with = "deserialize_event_date")]
    pub event_date: DateTime<Utc>,

    /// Minimum tier required to see the event
    pub tier: Tier,

    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Event {
    /// Create a new event without an image.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        event_date: DateTime<Utc>,
        tier: Tier,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            event_date,
            tier,
            image_url: None,
        }
    }

    /// Set the image reference.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// Parse a store date.
///
/// Accepts RFC 3339 (`timestamptz` columns), a date-time without offset
/// (`timestamp` columns, read as UTC) and a bare date (`date` columns,
/// read as midnight UTC).
fn parse_event_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid event date: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_from_store_row() {
        let row = serde_json::json!({
            "id": "0b6f7c1e-1f0a-4a55-9d8e-5a1f9c2b7e10",
            "title": "Founders AMA",
            "description": "Live Q&A",
            "event_date": "2025-03-01T18:00:00+00:00",
            "tier": "gold",
            "image_url": null,
            "created_at": "2025-01-10T09:00:00+00:00"
        });

        let event: Event = serde_json::from_value(row).unwrap();
        assert_eq!(event.tier, Tier::Gold);
        assert_eq!(
            event.event_date,
            Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
        );
        assert!(event.image_url.is_none());
    }

    #[test]
    fn test_event_date_forms() {
        let ten_am = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_event_date("2025-05-01T10:00:00Z"), Some(ten_am));
        assert_eq!(parse_event_date("2025-05-01T12:00:00+02:00"), Some(ten_am));
        assert_eq!(parse_event_date("2025-05-01T10:00:00"), Some(ten_am));
        assert_eq!(parse_event_date("2025-05-01 10:00:00"), Some(ten_am));
        assert_eq!(
            parse_event_date("2025-05-01T10:00:00.250"),
            Some(ten_am + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            parse_event_date("2025-05-01"),
            Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_event_date("next tuesday"), None);
    }

    #[test]
    fn test_unknown_tier_row_is_rejected() {
        let row = serde_json::json!({
            "id": "1",
            "title": "Mystery",
            "event_date": "2025-03-01T18:00:00Z",
            "tier": "bronze"
        });

        assert!(serde_json::from_value::<Event>(row).is_err());
    }

    #[test]
    fn test_image_is_omitted_when_absent() {
        let event = Event::new(
            "1",
            "Kickoff",
            "",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Tier::Free,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("image_url").is_none());

        let json = serde_json::to_value(event.with_image("https://cdn.example.com/k.png")).unwrap();
        assert_eq!(json["image_url"], "https://cdn.example.com/k.png");
    }
}
