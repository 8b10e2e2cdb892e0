//! Per-record leg latency computation.

use crate::domain::envelope::TelemetryEnvelope;
use crate::domain::topology::{LEG_COUNT, Leg, ProviderLegSchema};
use chrono::{DateTime, Utc};

/// Leg durations for one envelope. `None` means the leg is undefined for the
/// provider or one of its bounding timestamps is missing or unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct LegMeasurement {
    pub csp: String,
    pub log_id: Option<String>,
    pub source_key: String,
    pub legs: [Option<f64>; LEG_COUNT],
}

impl LegMeasurement {
    pub fn leg(&self, leg: Leg) -> Option<f64> {
        self.legs[leg.index()]
    }
}

/// Computes every leg of `schema` for one envelope.
///
/// Negative durations (clock skew, out-of-order stamps) are kept as-is.
pub fn compute_legs(
    envelope: &TelemetryEnvelope,
    schema: &ProviderLegSchema,
    source_key: &str,
) -> LegMeasurement {
    let mut legs = [None; LEG_COUNT];
    for span in &schema.legs {
        legs[span.leg.index()] = match (envelope.stage_time(&span.from), envelope.stage_time(&span.to)) {
            (Some(from), Some(to)) => Some(millis_between(from, to)),
            _ => None,
        };
    }

    LegMeasurement {
        csp: schema.name.clone(),
        log_id: envelope.log_id.clone(),
        source_key: source_key.to_string(),
        legs,
    }
}

/// `to - from` in milliseconds, sub-millisecond part preserved.
fn millis_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1_000_000.0,
        // Beyond ~292 years of skew; microseconds still fit
        None => delta.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::envelope::ORIGIN_STAGE;
    use crate::domain::topology::{
        RG_1_API_GATEWAY, RG_1_SQS_FORWARDER, RG_GOV_IMS_API_GATEWAY, RG_GOV_IMS_ARCHIVER,
        RG_GOV_IMS_CONVERTER,
    };
    use serde_json::{Map, Value};

    fn envelope(stamps: &[(&str, &str)]) -> TelemetryEnvelope {
        let timestamps: Map<String, Value> = stamps
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        TelemetryEnvelope {
            log_id: Some("id-1".to_string()),
            timestamps,
            csp: None,
            extra: Map::new(),
        }
    }

    fn full_aws_envelope() -> TelemetryEnvelope {
        envelope(&[
            (ORIGIN_STAGE, "2024-01-01T00:00:00Z"),
            (RG_1_API_GATEWAY, "2024-01-01T00:00:00.100Z"),
            (RG_1_SQS_FORWARDER, "2024-01-01T00:00:00.250Z"),
            (RG_GOV_IMS_API_GATEWAY, "2024-01-01T00:00:00.400Z"),
            (RG_GOV_IMS_CONVERTER, "2024-01-01T00:00:00.900Z"),
            (RG_GOV_IMS_ARCHIVER, "2024-01-01T00:00:01.000Z"),
        ])
    }

    #[test]
    fn test_aws_legs_worked_example() {
        let m = compute_legs(&full_aws_envelope(), &ProviderLegSchema::aws(), "aws-1.json");
        assert_eq!(m.csp, "AWS");
        assert_eq!(m.log_id.as_deref(), Some("id-1"));
        assert_eq!(m.legs, [Some(100.0), Some(150.0), Some(150.0), Some(500.0), Some(100.0)]);
    }

    #[test]
    fn test_missing_stamp_only_voids_adjacent_legs() {
        let mut env = full_aws_envelope();
        env.timestamps.remove(RG_1_SQS_FORWARDER);

        let m = compute_legs(&env, &ProviderLegSchema::aws(), "aws-1.json");
        assert_eq!(m.legs[0], Some(100.0));
        assert_eq!(m.legs[1], None);
        assert_eq!(m.legs[2], None);
        assert_eq!(m.legs[3], Some(500.0));
        assert_eq!(m.legs[4], Some(100.0));
    }

    #[test]
    fn test_malformed_stamp_is_absent_not_error() {
        let mut env = full_aws_envelope();
        env.timestamps.insert(
            RG_GOV_IMS_CONVERTER.to_string(),
            Value::String("not-a-time".to_string()),
        );

        let m = compute_legs(&env, &ProviderLegSchema::aws(), "aws-1.json");
        assert_eq!(m.legs[3], None);
        assert_eq!(m.legs[4], None);
        assert_eq!(m.legs[0], Some(100.0));
    }

    #[test]
    fn test_ibm_legs_two_and_three_always_absent() {
        // Even when forwarder stamps are present they are ignored for IBM
        let m = compute_legs(&full_aws_envelope(), &ProviderLegSchema::ibm(), "ibm-1.json");
        assert_eq!(m.csp, "IBM");
        assert_eq!(m.legs[0], Some(400.0));
        assert_eq!(m.legs[1], None);
        assert_eq!(m.legs[2], None);
        assert_eq!(m.legs[3], Some(500.0));
        assert_eq!(m.legs[4], Some(100.0));
    }

    #[test]
    fn test_negative_leg_is_preserved() {
        let env = envelope(&[
            (ORIGIN_STAGE, "2024-01-01T00:00:01Z"),
            (RG_GOV_IMS_API_GATEWAY, "2024-01-01T00:00:00.750Z"),
        ]);
        let m = compute_legs(&env, &ProviderLegSchema::ibm(), "ibm-2.json");
        assert_eq!(m.legs[0], Some(-250.0));
    }

    #[test]
    fn test_fractional_milliseconds_preserved() {
        let env = envelope(&[
            (ORIGIN_STAGE, "2024-01-01T00:00:00.000000+00:00"),
            (RG_GOV_IMS_API_GATEWAY, "2024-01-01T00:00:00.012345Z"),
        ]);
        let m = compute_legs(&env, &ProviderLegSchema::ibm(), "ibm-3.json");
        let leg1 = m.leg(Leg::ALL[0]).unwrap();
        assert!((leg1 - 12.345).abs() < 1e-9);
    }

    #[test]
    fn test_empty_envelope_yields_all_absent() {
        let m = compute_legs(&envelope(&[]), &ProviderLegSchema::aws(), "aws-empty.json");
        assert!(m.legs.iter().all(Option::is_none));
    }
}
