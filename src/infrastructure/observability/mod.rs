//! Push-based observability for govtrace
//!
//! Observability goes out only: tracing diagnostics on stderr, and a periodic
//! JSON snapshot of the emitter's Prometheus counters in the same log.
//! No HTTP server, no incoming requests.

pub mod logging;
pub mod metrics;
pub mod reporter;
pub mod submission_timer;

pub use logging::init_tracing;
pub use metrics::EmitterMetrics;
pub use reporter::EmitterReporter;
pub use submission_timer::SubmissionTimer;
