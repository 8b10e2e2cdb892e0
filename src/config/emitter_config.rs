//! Emitter configuration parsing from environment variables.

use super::{parse_or, string_or};
use crate::domain::errors::ConfigError;
use std::env;
use std::time::Duration;
use url::Url;

/// Emitter environment configuration
#[derive(Debug, Clone)]
pub struct EmitterEnvConfig {
    pub api_gateway_url: Url,
    pub metrics_interval: Duration,
    pub logs_interval: Duration,
    pub request_timeout: Duration,
    pub service_name: String,
    pub csp: String,
    pub cpu_sample_window: Duration,
    /// Zero disables the periodic counters report.
    pub report_interval: Duration,
}

impl EmitterEnvConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("API_GATEWAY_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar {
                name: "API_GATEWAY_URL",
            })?;
        let api_gateway_url =
            Url::parse(raw_url.trim()).map_err(|e| ConfigError::InvalidValue {
                name: "API_GATEWAY_URL",
                value: raw_url.clone(),
                reason: e.to_string(),
            })?;
        if !matches!(api_gateway_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "API_GATEWAY_URL",
                value: raw_url,
                reason: "scheme must be http or https".to_string(),
            });
        }

        let metrics_interval_sec: u64 = parse_or(&lookup, "METRICS_INTERVAL_SEC", 1)?;
        let logs_interval_sec: u64 = parse_or(&lookup, "LOGS_INTERVAL_SEC", 1)?;
        let request_timeout_sec: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SEC", 10)?;
        for (name, value) in [
            ("METRICS_INTERVAL_SEC", metrics_interval_sec),
            ("LOGS_INTERVAL_SEC", logs_interval_sec),
            ("REQUEST_TIMEOUT_SEC", request_timeout_sec),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: value.to_string(),
                    reason: "must be at least 1 second".to_string(),
                });
            }
        }

        Ok(Self {
            api_gateway_url,
            metrics_interval: Duration::from_secs(metrics_interval_sec),
            logs_interval: Duration::from_secs(logs_interval_sec),
            request_timeout: Duration::from_secs(request_timeout_sec),
            service_name: string_or(&lookup, "CNA_SERVICE_NAME", "cna-app"),
            csp: string_or(&lookup, "CNA_CSP", "IBM"),
            cpu_sample_window: Duration::from_millis(parse_or(
                &lookup,
                "CPU_SAMPLE_WINDOW_MS",
                1000,
            )?),
            report_interval: Duration::from_secs(parse_or(
                &lookup,
                "EMITTER_REPORT_INTERVAL_SEC",
                60,
            )?),
        })
    }

    /// Last characters of the gateway URL, safe to print.
    pub fn masked_url(&self) -> String {
        let url = self.api_gateway_url.as_str();
        let tail: String = url
            .chars()
            .rev()
            .take(10)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}
