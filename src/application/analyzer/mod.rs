pub mod loader;
pub mod pipeline;

pub use loader::{LoadReport, LoadedEnvelope, RecordLoader};
pub use pipeline::{AnalysisOutcome, LatencyAnalysis, ProviderLoadSummary};
