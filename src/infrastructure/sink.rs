//! Outcome sinks for the emitter's local structured log.

use crate::domain::ports::OutcomeSink;
use crate::domain::telemetry::OutcomeRecord;
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Writes one JSON object per line. The writer sits behind a mutex so the
/// metrics and logs cadences never interleave partial lines.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> OutcomeSink for JsonLinesSink<W> {
    fn record(&self, entry: &OutcomeRecord) -> Result<()> {
        let mut line = serde_json::to_vec(entry).context("Failed to serialize outcome record")?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer
            .write_all(&line)
            .context("Failed to write outcome record")?;
        writer.flush().context("Failed to flush outcome record")
    }
}

/// Keeps outcome records in memory; used by tests and dry runs.
#[derive(Clone, Default)]
pub struct InMemoryOutcomeSink {
    entries: Arc<Mutex<Vec<OutcomeRecord>>>,
}

impl InMemoryOutcomeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<OutcomeRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl OutcomeSink for InMemoryOutcomeSink {
    fn record(&self, entry: &OutcomeRecord) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::{DataType, TelemetryPayload};
    use std::collections::BTreeMap;

    fn record(id: &str) -> OutcomeRecord {
        OutcomeRecord::succeeded(
            TelemetryPayload {
                log_id: id.to_string(),
                service_name: "cna-app".to_string(),
                data_type: DataType::Logs,
                governance_data: None,
                timestamps: BTreeMap::new(),
                csp: "IBM".to_string(),
                error: None,
            },
            "{\"status\":\"ok\"}".to_string(),
        )
    }

    #[test]
    fn test_json_lines_one_object_per_line() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.record(&record("a")).unwrap();
        sink.record(&record("b")).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["log_id"], "a");
        assert_eq!(first["api_response"], "{\"status\":\"ok\"}");
        assert!(first["error"].is_null());
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let sink = Arc::new(JsonLinesSink::new(Vec::new()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.record(&record(&format!("{t}-{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(parsed.len(), 200);
    }

    #[test]
    fn test_in_memory_sink_clones_share_entries() {
        let sink = InMemoryOutcomeSink::new();
        let handle = sink.clone();
        sink.record(&record("x")).unwrap();
        assert_eq!(handle.entries().len(), 1);
    }
}
