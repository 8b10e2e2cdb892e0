//! HTTP delivery of telemetry payloads to the governance gateway.

use crate::domain::errors::TransmissionError;
use crate::domain::ports::TelemetryTransport;
use crate::domain::telemetry::TelemetryPayload;
use crate::infrastructure::core::HttpClientFactory;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpTelemetryTransport {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpTelemetryTransport {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(timeout)?,
            endpoint,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransmissionError {
        if err.is_timeout() {
            TransmissionError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            TransmissionError::Connect {
                reason: error_chain(&err),
            }
        } else {
            TransmissionError::Request {
                reason: error_chain(&err),
            }
        }
    }
}

/// Joins an error with its sources: "outer: inner: root".
fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[async_trait]
impl TelemetryTransport for HttpTelemetryTransport {
    async fn send(&self, payload: &TelemetryPayload) -> Result<String, TransmissionError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(
            "HttpTelemetryTransport: {} -> {} ({} bytes)",
            payload.log_id,
            status,
            body.len()
        );

        if status.is_success() {
            Ok(body)
        } else {
            Err(TransmissionError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
