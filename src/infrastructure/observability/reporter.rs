//! Push-based counters reporter for the emitter
//!
//! Periodically logs the submission counters as one structured JSON line.
//! Nothing is served; the report only goes out through the log.

use crate::infrastructure::observability::metrics::EmitterMetrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, warn};

const DATA_TYPES: [&str; 2] = ["metrics", "logs"];
const OUTCOMES: [&str; 5] = ["success", "timeout", "connect", "status", "request"];

/// Counters snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct EmitterSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    /// data type -> outcome -> count
    pub submissions: BTreeMap<String, BTreeMap<String, u64>>,
    pub sampling_failures: BTreeMap<String, u64>,
}

pub struct EmitterReporter {
    metrics: EmitterMetrics,
    start_time: Instant,
    interval: Duration,
}

impl EmitterReporter {
    pub fn new(metrics: EmitterMetrics, interval: Duration) -> Self {
        Self {
            metrics,
            start_time: Instant::now(),
            interval,
        }
    }

    /// Logs a snapshot every interval until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "EmitterReporter: Starting counters report (interval: {:?})",
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        // First tick fires immediately; nothing to report yet
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let snapshot = self.collect_snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => info!("EMITTER_METRICS_JSON:{}", json),
                Err(e) => warn!("Failed to serialize emitter counters: {}", e),
            }
        }
    }

    pub fn collect_snapshot(&self) -> EmitterSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.uptime_seconds.set(uptime as f64);

        let submissions = DATA_TYPES
            .iter()
            .map(|data_type| {
                let by_outcome = OUTCOMES
                    .iter()
                    .map(|outcome| {
                        (
                            outcome.to_string(),
                            self.metrics.submissions(data_type, outcome),
                        )
                    })
                    .collect();
                (data_type.to_string(), by_outcome)
            })
            .collect();

        let sampling_failures = DATA_TYPES
            .iter()
            .map(|data_type| {
                let count = self
                    .metrics
                    .sampling_failures_total
                    .with_label_values(&[*data_type])
                    .get() as u64;
                (data_type.to_string(), count)
            })
            .collect();

        EmitterSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            submissions,
            sampling_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = EmitterMetrics::new().unwrap();
        metrics.record_submission("logs", "success");
        metrics.record_submission("metrics", "timeout");
        metrics
            .sampling_failures_total
            .with_label_values(&["metrics"])
            .inc();

        let reporter = EmitterReporter::new(metrics, Duration::from_secs(60));
        let snapshot = reporter.collect_snapshot();

        assert_eq!(snapshot.submissions["logs"]["success"], 1);
        assert_eq!(snapshot.submissions["metrics"]["timeout"], 1);
        assert_eq!(snapshot.submissions["metrics"]["success"], 0);
        assert_eq!(snapshot.sampling_failures["metrics"], 1);
        assert!(!snapshot.timestamp.is_empty());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"timeout\":1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let metrics = EmitterMetrics::new().unwrap();
        let reporter = EmitterReporter::new(metrics, Duration::from_secs(1));
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(reporter.run(rx));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        tx.send(true).unwrap();

        handle.await.unwrap();
    }
}
