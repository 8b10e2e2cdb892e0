//! govtrace emitter - synthetic cloud-native application telemetry
//!
//! Samples host metrics and a fixed application log bundle on two independent
//! cadences and POSTs each payload to the governance API Gateway. Every outcome
//! is written to stdout as one JSON line; diagnostics go to stderr.
//!
//! # Usage
//! ```sh
//! API_GATEWAY_URL=https://gateway.example.com/prod/ingest cargo run --bin emitter
//! ```
//!
//! # Environment Variables
//! - `API_GATEWAY_URL` - Ingestion endpoint (required)
//! - `METRICS_INTERVAL_SEC` / `LOGS_INTERVAL_SEC` - Cadences (default: 1)
//! - `REQUEST_TIMEOUT_SEC` - Per-request timeout (default: 10)
//! - `EMITTER_REPORT_INTERVAL_SEC` - Counters report interval, 0 disables (default: 60)

use anyhow::{Context, Result};
use govtrace::application::emitter::{Cadences, Emitter, PayloadFactory};
use govtrace::config::{EmitterEnvConfig, ObservabilityEnvConfig};
use govtrace::infrastructure::observability::{EmitterMetrics, EmitterReporter, init_tracing};
use govtrace::infrastructure::{HttpTelemetryTransport, JsonLinesSink, SysinfoSampler};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let observability = ObservabilityEnvConfig::from_env()?;
    init_tracing(observability.log_format);

    let config = EmitterEnvConfig::from_env().context("Emitter configuration is invalid")?;

    info!("govtrace emitter {} starting...", env!("CARGO_PKG_VERSION"));
    info!("API Gateway URL: {}", config.masked_url());
    info!(
        "Metrics interval: {:?}, logs interval: {:?}, request timeout: {:?}",
        config.metrics_interval, config.logs_interval, config.request_timeout
    );
    info!("Service: {} ({})", config.service_name, config.csp);

    let transport = HttpTelemetryTransport::new(config.api_gateway_url.clone(), config.request_timeout)?;
    let sampler = SysinfoSampler::new(config.cpu_sample_window);
    let metrics = EmitterMetrics::new()?;

    let emitter = Arc::new(Emitter::new(
        Arc::new(sampler),
        Arc::new(transport),
        Arc::new(JsonLinesSink::stdout()),
        metrics.clone(),
        PayloadFactory::new(config.service_name.clone(), config.csp.clone()),
        Cadences {
            metrics: config.metrics_interval,
            logs: config.logs_interval,
        },
    ));
    emitter.announce();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reporter_handle = if config.report_interval.is_zero() {
        info!("Counters reporting disabled.");
        None
    } else {
        let reporter = EmitterReporter::new(metrics, config.report_interval);
        Some(tokio::spawn(reporter.run(shutdown_rx.clone())))
    };

    let emitter_handle = tokio::spawn(emitter.run(shutdown_rx));

    info!("Emitter running. Press Ctrl+C to shutdown.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Finishing current ticks...");

    shutdown_tx.send(true).ok();
    emitter_handle.await?;
    if let Some(handle) = reporter_handle {
        handle.await?;
    }

    info!("Emitter exited cleanly.");
    Ok(())
}
