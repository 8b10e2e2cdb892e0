//! Analyzer configuration parsing from environment variables.
//!
//! Command-line flags in the `analyzer` binary override these values.

use super::{parse_or, string_or};
use crate::domain::errors::ConfigError;
use std::env;
use std::path::PathBuf;

/// Analyzer environment configuration
#[derive(Debug, Clone)]
pub struct AnalyzerEnvConfig {
    pub archive_root: PathBuf,
    pub output_dir: PathBuf,
    pub page_size: usize,
    pub fetch_concurrency: usize,
    pub dedup_by_log_id: bool,
}

impl Default for AnalyzerEnvConfig {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from("archive"),
            output_dir: PathBuf::from("."),
            page_size: 1000,
            fetch_concurrency: 8,
            dedup_by_log_id: false,
        }
    }
}

impl AnalyzerEnvConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let page_size: usize = parse_or(&lookup, "ARCHIVE_PAGE_SIZE", defaults.page_size)?;
        let fetch_concurrency: usize = parse_or(
            &lookup,
            "ARCHIVE_FETCH_CONCURRENCY",
            defaults.fetch_concurrency,
        )?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ARCHIVE_PAGE_SIZE",
                value: "0".to_string(),
                reason: "page size must be positive".to_string(),
            });
        }

        Ok(Self {
            archive_root: PathBuf::from(string_or(&lookup, "ARCHIVE_ROOT", "archive")),
            output_dir: PathBuf::from(string_or(&lookup, "ANALYSIS_OUTPUT_DIR", ".")),
            page_size,
            fetch_concurrency: fetch_concurrency.max(1),
            dedup_by_log_id: parse_or(&lookup, "ANALYSIS_DEDUP_LOG_ID", false)?,
        })
    }
}
