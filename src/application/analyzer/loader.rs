//! Record loader: pulls every archived envelope under a key prefix.

use crate::domain::envelope::TelemetryEnvelope;
use crate::domain::errors::SourceError;
use crate::domain::ports::ArchiveStore;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Suffix marking structured-data records in the archive.
pub const RECORD_SUFFIX: &str = ".json";

/// An envelope together with the archive key it came from.
#[derive(Debug, Clone)]
pub struct LoadedEnvelope {
    pub key: String,
    pub envelope: TelemetryEnvelope,
}

/// Result of loading one prefix.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub envelopes: Vec<LoadedEnvelope>,
    /// `.json` objects whose body could not be read as an envelope
    pub skipped: usize,
    /// Keys without the record suffix, plus objects that have no usable key
    pub ignored: usize,
}

pub struct RecordLoader {
    store: Arc<dyn ArchiveStore>,
    concurrency: usize,
}

impl RecordLoader {
    pub fn new(store: Arc<dyn ArchiveStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Loads every envelope whose key starts with `prefix`.
    ///
    /// Listing and fetch failures abort the load; malformed bodies are
    /// skipped and counted.
    pub async fn load(&self, prefix: &str) -> Result<LoadReport, SourceError> {
        info!("Loading JSON records with prefix '{}'", prefix);

        let mut record_keys = Vec::new();
        let mut ignored = 0usize;
        let mut continuation: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .store
                .list_page(prefix, continuation.as_deref())
                .await?;
            pages += 1;
            ignored += page.unaddressable;

            for key in page.keys {
                if key.ends_with(RECORD_SUFFIX) {
                    record_keys.push(key);
                } else {
                    ignored += 1;
                }
            }

            match page.continuation {
                Some(next) => continuation = Some(next),
                None => break,
            }
        }
        debug!(
            "Listed {} record keys over {} page(s) for '{}'",
            record_keys.len(),
            pages,
            prefix
        );

        let fetched: Vec<(String, Vec<u8>)> = stream::iter(record_keys)
            .map(|key| {
                let store = self.store.clone();
                async move {
                    let body = store.get_object(&key).await?;
                    Ok::<_, SourceError>((key, body))
                }
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let mut report = LoadReport {
            ignored,
            ..LoadReport::default()
        };
        for (key, body) in fetched {
            match TelemetryEnvelope::from_slice(&body) {
                Ok(envelope) => report.envelopes.push(LoadedEnvelope { key, envelope }),
                Err(e) => {
                    warn!("Skipping malformed record {}: {}", key, e);
                    report.skipped += 1;
                }
            }
        }

        info!(
            "Loaded {} JSON records with prefix '{}' (skipped {}, ignored {})",
            report.envelopes.len(),
            prefix,
            report.skipped,
            report.ignored
        );
        Ok(report)
    }
}
