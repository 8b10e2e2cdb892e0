//! One analysis run: load each provider's records, compute legs, aggregate.

use crate::application::analyzer::loader::{LoadReport, RecordLoader};
use crate::domain::errors::SourceError;
use crate::domain::legs::{LegMeasurement, compute_legs};
use crate::domain::statistics::AggregateStatistics;
use crate::domain::topology::PipelineTopology;
use std::collections::HashSet;
use tracing::info;

/// Per-provider load counters, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLoadSummary {
    pub csp: String,
    pub prefix: String,
    pub loaded: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub duplicates_dropped: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// One row per envelope, sorted by (provider, archive key)
    pub measurements: Vec<LegMeasurement>,
    pub statistics: AggregateStatistics,
    pub providers: Vec<ProviderLoadSummary>,
}

pub struct LatencyAnalysis {
    loader: RecordLoader,
    topology: PipelineTopology,
    dedup_by_log_id: bool,
}

impl LatencyAnalysis {
    pub fn new(loader: RecordLoader, topology: PipelineTopology) -> Self {
        Self {
            loader,
            topology,
            dedup_by_log_id: false,
        }
    }

    /// Keep only the first record (by archive key) per (provider, log_id).
    pub fn with_dedup_by_log_id(mut self, enabled: bool) -> Self {
        self.dedup_by_log_id = enabled;
        self
    }

    pub fn topology(&self) -> &PipelineTopology {
        &self.topology
    }

    pub async fn run(&self) -> Result<AnalysisOutcome, SourceError> {
        let mut measurements = Vec::new();
        let mut providers = Vec::new();

        for schema in &self.topology.providers {
            let LoadReport {
                mut envelopes,
                skipped,
                ignored,
            } = self.loader.load(&schema.prefix).await?;
            envelopes.sort_by(|a, b| a.key.cmp(&b.key));

            let loaded = envelopes.len();
            let mut seen = HashSet::new();
            let mut duplicates_dropped = 0usize;

            for loaded_envelope in &envelopes {
                if self.dedup_by_log_id {
                    if let Some(id) = &loaded_envelope.envelope.log_id {
                        if !seen.insert(id.clone()) {
                            duplicates_dropped += 1;
                            continue;
                        }
                    }
                }
                measurements.push(compute_legs(
                    &loaded_envelope.envelope,
                    schema,
                    &loaded_envelope.key,
                ));
            }

            info!(
                "Calculated legs for {} {} record(s){}",
                loaded - duplicates_dropped,
                schema.name,
                if duplicates_dropped > 0 {
                    format!(" ({} duplicate log_id dropped)", duplicates_dropped)
                } else {
                    String::new()
                }
            );

            providers.push(ProviderLoadSummary {
                csp: schema.name.clone(),
                prefix: schema.prefix.clone(),
                loaded,
                skipped,
                ignored,
                duplicates_dropped,
            });
        }

        measurements.sort_by(|a, b| {
            a.csp
                .cmp(&b.csp)
                .then_with(|| a.source_key.cmp(&b.source_key))
        });
        let statistics =
            AggregateStatistics::compute(&self.topology.provider_names(), &measurements);

        Ok(AnalysisOutcome {
            measurements,
            statistics,
            providers,
        })
    }
}
