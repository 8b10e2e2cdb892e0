//! Wire types for emitted telemetry and the local outcome log.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Metrics,
    Logs,
    Initialization,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Metrics => "metrics",
            DataType::Logs => "logs",
            DataType::Initialization => "initialization",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host metrics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub memory_usage: f64,
    pub cpu_usage: f64,
    pub disk_usage: f64,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub additional_metric_1: String,
    pub additional_metric_2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GovernanceData {
    Metrics(MetricsSnapshot),
    Logs(BTreeMap<String, String>),
}

/// Request body POSTed to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub log_id: String,
    pub service_name: String,
    pub data_type: DataType,
    pub governance_data: Option<GovernanceData>,
    pub timestamps: BTreeMap<String, String>,
    #[serde(rename = "CSP")]
    pub csp: String,
    pub error: Option<String>,
}

/// One line of the local structured outcome log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub log_id: String,
    pub service_name: String,
    pub data_type: DataType,
    pub governance_data: Option<GovernanceData>,
    pub timestamps: BTreeMap<String, String>,
    #[serde(rename = "CSP")]
    pub csp: String,
    pub error: Option<String>,
    pub api_response: Option<String>,
}

impl OutcomeRecord {
    pub fn succeeded(payload: TelemetryPayload, api_response: String) -> Self {
        Self::from_payload(payload, None, Some(api_response))
    }

    pub fn failed(payload: TelemetryPayload, error: String) -> Self {
        Self::from_payload(payload, Some(error), None)
    }

    fn from_payload(
        payload: TelemetryPayload,
        error: Option<String>,
        api_response: Option<String>,
    ) -> Self {
        Self {
            log_id: payload.log_id,
            service_name: payload.service_name,
            data_type: payload.data_type,
            governance_data: payload.governance_data,
            timestamps: payload.timestamps,
            csp: payload.csp,
            error,
            api_response,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> TelemetryPayload {
        TelemetryPayload {
            log_id: "5d6c".to_string(),
            service_name: "cna-app".to_string(),
            data_type: DataType::Metrics,
            governance_data: Some(GovernanceData::Metrics(MetricsSnapshot {
                memory_usage: 41.5,
                cpu_usage: 3.0,
                disk_usage: 70.1,
                bytes_sent: 1024,
                bytes_recv: 2048,
                additional_metric_1: "value_1".to_string(),
                additional_metric_2: "value_2".to_string(),
            })),
            timestamps: BTreeMap::from([(
                "cna_timestamp".to_string(),
                "2024-01-01T00:00:00+00:00".to_string(),
            )]),
            csp: "IBM".to_string(),
            error: None,
        }
    }

    #[test]
    fn test_payload_wire_shape() {
        let value = serde_json::to_value(payload()).unwrap();
        assert_eq!(value["data_type"], "metrics");
        assert_eq!(value["CSP"], "IBM");
        assert_eq!(value["error"], json!(null));
        assert_eq!(value["governance_data"]["bytes_recv"], 2048);
        assert_eq!(
            value["timestamps"]["cna_timestamp"],
            "2024-01-01T00:00:00+00:00"
        );
        assert!(value.get("api_response").is_none());
    }

    #[test]
    fn test_failed_outcome_has_error_and_null_response() {
        let record = OutcomeRecord::failed(payload(), "connection refused".to_string());
        assert!(!record.is_success());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "connection refused");
        assert_eq!(value["api_response"], json!(null));
        assert_eq!(value["log_id"], "5d6c");
    }

    #[test]
    fn test_logs_governance_data_round_trips_untagged() {
        let logs = GovernanceData::Logs(BTreeMap::from([(
            "log_1".to_string(),
            "Application started successfully.".to_string(),
        )]));
        let text = serde_json::to_string(&logs).unwrap();
        let back: GovernanceData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, logs);
    }
}
