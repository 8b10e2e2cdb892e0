use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the HTTP client used for telemetry submission.
    ///
    /// Submissions are never retried: a failed payload is logged and dropped,
    /// the next tick produces a fresh one. The whole request is bounded by
    /// `timeout`; connecting gets at most half of it.
    pub fn create_client(timeout: Duration) -> Result<Client> {
        let connect_timeout = (timeout / 2).max(Duration::from_millis(100));

        Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("govtrace-emitter/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }
}
