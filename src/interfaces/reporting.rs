//! Reporting utilities for analysis results.
//!
//! Provides the CSV exports and the formatted console summary.

use crate::application::analyzer::ProviderLoadSummary;
use crate::domain::legs::LegMeasurement;
use crate::domain::statistics::AggregateStatistics;
use crate::domain::topology::Leg;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const OBSERVATIONS_FILE: &str = "time_diffs_observations.csv";
pub const STATISTICS_FILE: &str = "time_diffs_statistics.csv";
pub const PLOT_FILE: &str = "time_delay_plot.svg";

/// Writes analysis outputs into one directory.
pub struct AnalysisReporter {
    output_dir: PathBuf,
}

impl AnalysisReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory: {:?}",
            self.output_dir
        ))
    }

    /// Exports one row per measurement. Rows are written in the given order.
    pub fn write_observations(&self, measurements: &[LegMeasurement]) -> Result<PathBuf> {
        self.prepare()?;
        let path = self.output_path(OBSERVATIONS_FILE);
        let mut wtr = csv::Writer::from_path(&path)
            .context(format!("Failed to create {}", path.display()))?;

        let mut header = vec!["CSP".to_string(), "log_id".to_string(), "source_key".to_string()];
        header.extend(Leg::ALL.iter().map(|leg| leg.label()));
        wtr.write_record(&header)?;

        for m in measurements {
            let mut record = vec![
                m.csp.clone(),
                m.log_id.clone().unwrap_or_default(),
                m.source_key.clone(),
            ];
            record.extend(m.legs.iter().map(|v| format_cell(*v)));
            wtr.write_record(&record)
                .context(format!("Failed to write row for {}", m.source_key))?;
        }
        wtr.flush()
            .context(format!("Failed to flush {}", path.display()))?;

        Ok(path)
    }

    /// Exports one row per (provider, leg).
    pub fn write_statistics(&self, statistics: &AggregateStatistics) -> Result<PathBuf> {
        self.prepare()?;
        let path = self.output_path(STATISTICS_FILE);
        let mut wtr = csv::Writer::from_path(&path)
            .context(format!("Failed to create {}", path.display()))?;

        wtr.write_record([
            "CSP",
            "Leg",
            "count",
            "mean",
            "median",
            "std",
            "min",
            "max",
            "negative_count",
        ])?;

        for row in &statistics.rows {
            let cells = match &row.summary {
                Some(s) => vec![
                    s.count.to_string(),
                    format_cell(Some(s.mean)),
                    format_cell(Some(s.median)),
                    format_cell(Some(s.std_dev)),
                    format_cell(Some(s.min)),
                    format_cell(Some(s.max)),
                    s.negative_count.to_string(),
                ],
                None => vec![
                    "0".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    "0".to_string(),
                ],
            };
            let mut record = vec![row.csp.clone(), row.leg.label()];
            record.extend(cells);
            wtr.write_record(&record)?;
        }
        wtr.flush()
            .context(format!("Failed to flush {}", path.display()))?;

        Ok(path)
    }

    /// Prints per-provider load counters.
    pub fn print_load_summary(&self, providers: &[ProviderLoadSummary]) {
        println!("\n📥 Records loaded:");
        for p in providers {
            println!(
                "  {:<6} ({:<5}) loaded: {:>6}  skipped: {:>4}  ignored: {:>4}  duplicates: {:>4}",
                p.csp, p.prefix, p.loaded, p.skipped, p.ignored, p.duplicates_dropped
            );
        }
    }

    /// Prints a formatted table of the grouped statistics.
    pub fn print_summary_table(&self, statistics: &AggregateStatistics) {
        println!("\n{}", "=".repeat(96));
        println!("⏱  LEG LATENCY SUMMARY (ms)");
        println!("{}", "=".repeat(96));

        println!(
            "{:<6} | {:<5} | {:>6} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>4}",
            "CSP", "Leg", "Count", "Mean", "Median", "Std", "Min", "Max", "Neg"
        );
        println!("{}", "-".repeat(96));

        for row in &statistics.rows {
            match &row.summary {
                Some(s) => println!(
                    "{:<6} | {:<5} | {:>6} | {:>10.3} | {:>10.3} | {:>10} | {:>10.3} | {:>10.3} | {:>4}",
                    row.csp,
                    row.leg.label(),
                    s.count,
                    s.mean,
                    s.median,
                    if s.std_dev.is_nan() {
                        "-".to_string()
                    } else {
                        format!("{:.3}", s.std_dev)
                    },
                    s.min,
                    s.max,
                    s.negative_count
                ),
                None => println!(
                    "{:<6} | {:<5} | {:>6} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>4}",
                    row.csp,
                    row.leg.label(),
                    0,
                    "no data",
                    "",
                    "",
                    "",
                    "",
                    0
                ),
            }
        }

        println!("{}\n", "=".repeat(96));
    }

    /// Prints where each output landed.
    pub fn print_outputs(&self, paths: &[&Path]) {
        for path in paths {
            println!("💾 Saved: {}", path.display());
        }
    }
}

impl Default for AnalysisReporter {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Empty for absent or NaN values.
fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}
