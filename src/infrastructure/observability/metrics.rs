//! Prometheus metrics definitions for the emitter
//!
//! All metrics use the `govtrace_` prefix and are only read back by the
//! push-style reporter; nothing is served over HTTP.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the emitter loop
#[derive(Clone)]
pub struct EmitterMetrics {
    registry: Arc<Registry>,
    /// Submissions by data type and outcome (success / failure kind)
    pub submissions_total: CounterVec,
    /// Failed host metric samples
    pub sampling_failures_total: CounterVec,
    /// Gateway round-trip latency in seconds, by data type
    pub submission_latency_seconds: HistogramVec,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl EmitterMetrics {
    /// Create a new EmitterMetrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let submissions_total = CounterVec::new(
            Opts::new(
                "govtrace_submissions_total",
                "Telemetry submissions by data type and outcome",
            ),
            &["data_type", "outcome"],
        )?;
        registry.register(Box::new(submissions_total.clone()))?;

        let sampling_failures_total = CounterVec::new(
            Opts::new(
                "govtrace_sampling_failures_total",
                "Host metric samples that could not be collected",
            ),
            &["data_type"],
        )?;
        registry.register(Box::new(sampling_failures_total.clone()))?;

        let submission_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "govtrace_submission_latency_seconds",
                "Gateway submission latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["data_type"],
        )?;
        registry.register(Box::new(submission_latency_seconds.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "govtrace_uptime_seconds",
            "Emitter uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            submissions_total,
            sampling_failures_total,
            submission_latency_seconds,
            uptime_seconds,
        })
    }

    pub fn record_submission(&self, data_type: &str, outcome: &str) {
        self.submissions_total
            .with_label_values(&[data_type, outcome])
            .inc();
    }

    pub fn submissions(&self, data_type: &str, outcome: &str) -> u64 {
        self.submissions_total
            .with_label_values(&[data_type, outcome])
            .get() as u64
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}
