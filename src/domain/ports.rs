use crate::domain::errors::{SamplingError, SourceError, TransmissionError};
use crate::domain::telemetry::{MetricsSnapshot, OutcomeRecord, TelemetryPayload};
use anyhow::Result;
use async_trait::async_trait;

/// One page of an archive listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Token for the next page; `None` once the listing is exhausted.
    pub continuation: Option<String>,
    /// Objects under the prefix whose names cannot be used as keys.
    /// Reported on the first page of a listing only.
    pub unaddressable: usize,
}

/// Read access to the telemetry archive (bucket or a local mirror of it).
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ObjectPage, SourceError>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, SourceError>;
}

#[async_trait]
pub trait MetricsSampler: Send + Sync {
    async fn sample(&self) -> Result<MetricsSnapshot, SamplingError>;
}

/// Delivers one payload to the gateway, returning the response text.
#[async_trait]
pub trait TelemetryTransport: Send + Sync {
    async fn send(&self, payload: &TelemetryPayload) -> Result<String, TransmissionError>;
}

/// Append-only destination for outcome records. Implementations must keep
/// concurrent writers from interleaving partial lines.
pub trait OutcomeSink: Send + Sync {
    fn record(&self, entry: &OutcomeRecord) -> Result<()>;
}
