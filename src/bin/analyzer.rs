//! govtrace analyzer - per-leg latency analysis of archived telemetry
//!
//! Loads every archived envelope for each configured provider, computes the
//! per-leg latencies, and writes the observations CSV, the grouped statistics
//! CSV and a log-scaled boxplot SVG.
//!
//! # Usage
//! ```sh
//! cargo run --bin analyzer -- --archive-root ./archive --output-dir ./out
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use govtrace::application::analyzer::{LatencyAnalysis, RecordLoader};
use govtrace::config::{AnalyzerEnvConfig, ObservabilityEnvConfig};
use govtrace::domain::topology::PipelineTopology;
use govtrace::infrastructure::LocalArchiveStore;
use govtrace::infrastructure::observability::init_tracing;
use govtrace::interfaces::reporting::PLOT_FILE;
use govtrace::interfaces::{AnalysisReporter, render_leg_boxplots};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "analyzer")]
#[command(about = "Per-leg latency analysis of archived governance telemetry", long_about = None)]
struct Cli {
    /// Directory mirroring the archive bucket [env: ARCHIVE_ROOT]
    #[arg(long)]
    archive_root: Option<PathBuf>,

    /// Where the CSVs and the plot are written [env: ANALYSIS_OUTPUT_DIR]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML file replacing the built-in provider leg schemas
    #[arg(long)]
    topology: Option<PathBuf>,

    /// Keep only the first record per (provider, log_id)
    #[arg(long)]
    dedup_log_id: bool,

    /// Keys per listing page [env: ARCHIVE_PAGE_SIZE]
    #[arg(long)]
    page_size: Option<usize>,

    /// Concurrent object fetches [env: ARCHIVE_FETCH_CONCURRENCY]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Skip rendering the boxplot SVG
    #[arg(long)]
    no_plot: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let observability = ObservabilityEnvConfig::from_env()?;
    init_tracing(observability.log_format);

    let cli = Cli::parse();
    let mut config = AnalyzerEnvConfig::from_env().context("Analyzer configuration is invalid")?;
    if let Some(root) = cli.archive_root {
        config.archive_root = root;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(page_size) = cli.page_size {
        anyhow::ensure!(page_size > 0, "--page-size must be positive");
        config.page_size = page_size;
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch_concurrency = concurrency.max(1);
    }
    config.dedup_by_log_id |= cli.dedup_log_id;

    let topology = match &cli.topology {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .context(format!("Failed to read topology file {}", path.display()))?;
            PipelineTopology::from_toml(&content)
                .context(format!("Failed to load topology from {}", path.display()))?
        }
        None => PipelineTopology::default(),
    };

    info!("govtrace analyzer {} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Archive: {}, providers: {:?}, dedup by log_id: {}",
        config.archive_root.display(),
        topology.provider_names(),
        config.dedup_by_log_id
    );

    let store = LocalArchiveStore::new(config.archive_root.clone(), config.page_size);
    let loader = RecordLoader::new(Arc::new(store), config.fetch_concurrency);
    let analysis =
        LatencyAnalysis::new(loader, topology).with_dedup_by_log_id(config.dedup_by_log_id);

    let outcome = analysis.run().await.context("Failed to load archived telemetry")?;
    info!("Computed {} measurement row(s)", outcome.measurements.len());

    let reporter = AnalysisReporter::new(config.output_dir.clone());
    let observations = reporter.write_observations(&outcome.measurements)?;
    info!("Observations written to {}", observations.display());
    let statistics = reporter.write_statistics(&outcome.statistics)?;
    info!("Statistics written to {}", statistics.display());

    let plot = reporter.output_path(PLOT_FILE);
    let mut outputs = vec![observations.as_path(), statistics.as_path()];
    if cli.no_plot {
        info!("Plot rendering skipped.");
    } else {
        render_leg_boxplots(
            &plot,
            &outcome.measurements,
            &analysis.topology().provider_names(),
        )?;
        info!("Plot written to {}", plot.display());
        outputs.push(plot.as_path());
    }

    reporter.print_load_summary(&outcome.providers);
    reporter.print_summary_table(&outcome.statistics);
    reporter.print_outputs(&outputs);

    Ok(())
}
