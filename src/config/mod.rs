//! Configuration module for govtrace.
//!
//! Configuration is loaded from environment variables once at process entry
//! and handed to the emitter or analyzer as plain structs, organized by
//! concern: Emitter, Analyzer, and Observability.

mod analyzer_config;
mod emitter_config;
mod observability_config;

pub use analyzer_config::AnalyzerEnvConfig;
pub use emitter_config::EmitterEnvConfig;
pub use observability_config::{LogFormat, ObservabilityEnvConfig};

use crate::domain::errors::ConfigError;
use std::str::FromStr;

/// Parses `name` with `FromStr`, falling back to `default` when unset or blank.
///
/// A set-but-invalid value is an error rather than a silent default.
pub(crate) fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

/// String variable with a default.
pub(crate) fn string_or<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_or_default_when_unset_or_blank() {
        let lookup = lookup_from(&[("BLANK", "  ")]);
        assert_eq!(parse_or(&lookup, "UNSET", 7u64).unwrap(), 7);
        assert_eq!(parse_or(&lookup, "BLANK", 7u64).unwrap(), 7);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        let lookup = lookup_from(&[("METRICS_INTERVAL_SEC", "soon")]);
        let err = parse_or(&lookup, "METRICS_INTERVAL_SEC", 1u64).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "METRICS_INTERVAL_SEC", .. }));
    }

    #[test]
    fn test_string_or() {
        let lookup = lookup_from(&[("CNA_CSP", "AWS")]);
        assert_eq!(string_or(&lookup, "CNA_CSP", "IBM"), "AWS");
        assert_eq!(string_or(&lookup, "CNA_SERVICE_NAME", "cna-app"), "cna-app");
    }
}
