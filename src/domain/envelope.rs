//! Archived telemetry envelopes.
//!
//! An envelope is the JSON record written by the archiving stage. Only the
//! `timestamps` mapping takes part in latency computation; every other field
//! is carried through untouched.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp written by the emitter when a payload is created.
pub const ORIGIN_STAGE: &str = "cna_timestamp";

/// One archived telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,

    /// Stage name -> ISO-8601 timestamp.
    #[serde(default)]
    pub timestamps: Map<String, Value>,

    #[serde(rename = "CSP", default, skip_serializing_if = "Option::is_none")]
    pub csp: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TelemetryEnvelope {
    /// Parses a raw archive object body.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Raw value of a stage timestamp, if present and a string.
    pub fn stage(&self, stage: &str) -> Option<&str> {
        self.timestamps.get(stage).and_then(Value::as_str)
    }

    /// Parsed stage timestamp. Missing and malformed values are both `None`.
    pub fn stage_time(&self, stage: &str) -> Option<DateTime<Utc>> {
        self.stage(stage).and_then(parse_timestamp)
    }
}

/// Parses an ISO-8601 timestamp.
///
/// Values carrying an offset are converted to UTC; values without one are
/// read as UTC wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Basic-format offsets such as `+0530`
    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|naive| naive.and_utc())
}

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_variants() {
        let z = parse_timestamp("2024-01-01T00:00:00.250Z").unwrap();
        assert_eq!(z.nanosecond(), 250_000_000);

        let offset = parse_timestamp("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, parse_timestamp("2024-01-01T00:00:00Z").unwrap());

        let naive = parse_timestamp("2024-01-01T00:00:00.123456").unwrap();
        assert_eq!(naive.nanosecond(), 123_456_000);

        let spaced = parse_timestamp("2024-01-01 00:00:01").unwrap();
        assert_eq!(spaced.second(), 1);

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_parse_basic_format_offsets() {
        let utc = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00:00+0000"), Some(utc));

        let india = parse_timestamp("2024-01-01T00:00:00.100+0530").unwrap();
        assert_eq!(india, parse_timestamp("2023-12-31T18:30:00.100Z").unwrap());
        assert_eq!(india.nanosecond(), 100_000_000);

        let spaced = parse_timestamp("2024-01-01 01:00:00-0100").unwrap();
        assert_eq!(spaced.hour(), 2);
    }

    #[test]
    fn test_parse_minute_precision() {
        let expected = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2024-01-01T00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T05:30+0530"), Some(expected));
    }

    #[test]
    fn test_envelope_passes_unknown_fields_through() {
        let raw = br#"{
            "log_id": "abc",
            "service_name": "cna-app",
            "data_type": "logs",
            "governance_data": {"log_1": "Application started successfully."},
            "timestamps": {"cna_timestamp": "2024-01-01T00:00:00Z", "bogus": 42},
            "CSP": "IBM",
            "error": null
        }"#;

        let envelope = TelemetryEnvelope::from_slice(raw).unwrap();
        assert_eq!(envelope.log_id.as_deref(), Some("abc"));
        assert_eq!(envelope.csp.as_deref(), Some("IBM"));
        assert_eq!(envelope.extra["service_name"], "cna-app");
        assert!(envelope.extra.contains_key("governance_data"));
        assert!(envelope.stage_time(ORIGIN_STAGE).is_some());
        // Non-string stamps are unparseable, not a failure
        assert!(envelope.stage("bogus").is_none());
    }

    #[test]
    fn test_missing_timestamps_is_empty_mapping() {
        let envelope = TelemetryEnvelope::from_slice(br#"{"CSP": "AWS"}"#).unwrap();
        assert!(envelope.timestamps.is_empty());
        assert!(envelope.stage_time(ORIGIN_STAGE).is_none());
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(TelemetryEnvelope::from_slice(b"[1, 2, 3]").is_err());
        assert!(TelemetryEnvelope::from_slice(br#"{"timestamps": "now"}"#).is_err());
        assert!(TelemetryEnvelope::from_slice(b"not json").is_err());
    }
}
