//! Builds the telemetry payloads sent on each tick.

use crate::domain::envelope::ORIGIN_STAGE;
use crate::domain::telemetry::{DataType, GovernanceData, OutcomeRecord, TelemetryPayload};
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

const APPLICATION_LOGS: [&str; 10] = [
    "Application started successfully.",
    "Collecting system metrics.",
    "Metrics collected successfully.",
    "Sending data to API Gateway.",
    "Data sent successfully.",
    "Error handling and logging mechanism operational.",
    "System monitoring and logging active.",
    "Routine check completed successfully.",
    "No errors detected in the last cycle.",
    "All systems functional.",
];

/// The fixed application log bundle (`log_1` ..= `log_10`).
pub fn application_log_bundle() -> BTreeMap<String, String> {
    APPLICATION_LOGS
        .iter()
        .enumerate()
        .map(|(i, msg)| (format!("log_{}", i + 1), msg.to_string()))
        .collect()
}

/// Stamps payloads with identity, origin time and a fresh `log_id`.
#[derive(Debug, Clone)]
pub struct PayloadFactory {
    service_name: String,
    csp: String,
}

impl PayloadFactory {
    pub fn new(service_name: impl Into<String>, csp: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            csp: csp.into(),
        }
    }

    pub fn csp(&self) -> &str {
        &self.csp
    }

    /// A new payload carrying a single `cna_timestamp` taken now.
    pub fn build(
        &self,
        data_type: DataType,
        governance_data: Option<GovernanceData>,
    ) -> TelemetryPayload {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        TelemetryPayload {
            log_id: Uuid::new_v4().to_string(),
            service_name: self.service_name.clone(),
            data_type,
            governance_data,
            timestamps: BTreeMap::from([(ORIGIN_STAGE.to_string(), now)]),
            csp: self.csp.clone(),
            error: None,
        }
    }

    /// The record written once when the emitter starts.
    pub fn initialization_record(&self) -> OutcomeRecord {
        OutcomeRecord {
            log_id: Uuid::new_v4().to_string(),
            service_name: self.service_name.clone(),
            data_type: DataType::Initialization,
            governance_data: None,
            timestamps: BTreeMap::from([(
                "initial_timestamp".to_string(),
                Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
            )]),
            csp: self.csp.clone(),
            error: None,
            api_response: None,
        }
    }
}
