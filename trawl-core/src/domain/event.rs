//! Event record domain model

use serde::{Deserialize, Serialize};

/// One event returned by a search cycle
///
/// Structure shared between the client (which parses server results) and the
/// poller (which hands batches of events to the sink). The `Display` form is
/// the single line the sink writes per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEvent {
    /// Raw event text as indexed by the server
    #[serde(rename = "_raw", default)]
    pub raw: String,

    /// Event timestamp as reported by the server
    #[serde(rename = "_time", default)]
    pub time: Option<String>,

    /// Originating source, if the server reported one
    #[serde(default)]
    pub source: Option<String>,

    /// Source type, if the server reported one
    #[serde(default)]
    pub sourcetype: Option<String>,
}

impl SearchEvent {
    /// Creates an event carrying only raw text
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            time: None,
            source: None,
            sourcetype: None,
        }
    }
}

impl std::fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.time {
            Some(time) => write!(f, "{} {}", time, self.raw),
            None => write!(f, "{}", self.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_single_line() {
        let event = SearchEvent::from_raw("ERROR disk full on /dev/sda1");
        assert_eq!(event.to_string(), "ERROR disk full on /dev/sda1");

        let mut stamped = SearchEvent::from_raw("ERROR disk full");
        stamped.time = Some("2026-08-24T10:15:00.000+00:00".to_string());
        assert_eq!(
            stamped.to_string(),
            "2026-08-24T10:15:00.000+00:00 ERROR disk full"
        );
    }

    #[test]
    fn test_deserializes_server_result_shape() {
        let json = r#"{
            "_raw": "GET /health 200",
            "_time": "2026-08-24T10:15:00.000+00:00",
            "source": "/var/log/access.log",
            "sourcetype": "access_combined"
        }"#;

        let event: SearchEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.raw, "GET /health 200");
        assert_eq!(event.source.as_deref(), Some("/var/log/access.log"));
    }
}
