pub mod archive;
pub mod core;
pub mod observability;
pub mod sink;
pub mod system_metrics;
pub mod transport;

pub use archive::{InMemoryArchiveStore, LocalArchiveStore};
pub use sink::{InMemoryOutcomeSink, JsonLinesSink};
pub use system_metrics::SysinfoSampler;
pub use transport::HttpTelemetryTransport;
