//! Emitter loop
//!
//! Each cadence (metrics, logs) runs as its own tokio task on a fixed
//! interval and walks `Idle -> Sampling -> Transmitting -> Recording -> Idle`
//! once per tick. Every tick ends with exactly one outcome record, whatever
//! happened along the way. There is no retry: the next tick builds a fresh
//! payload.

use crate::application::emitter::payload::{PayloadFactory, application_log_bundle};
use crate::domain::ports::{MetricsSampler, OutcomeSink, TelemetryTransport};
use crate::domain::telemetry::{DataType, GovernanceData, OutcomeRecord};
use crate::infrastructure::observability::{EmitterMetrics, SubmissionTimer};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Idle,
    Sampling,
    Transmitting,
    Recording,
}

/// Per-cadence periods.
#[derive(Debug, Clone, Copy)]
pub struct Cadences {
    pub metrics: Duration,
    pub logs: Duration,
}

pub struct Emitter {
    sampler: Arc<dyn MetricsSampler>,
    transport: Arc<dyn TelemetryTransport>,
    sink: Arc<dyn OutcomeSink>,
    metrics: EmitterMetrics,
    factory: PayloadFactory,
    cadences: Cadences,
    // [metrics, logs]
    states: Mutex<[EmitterState; 2]>,
}

impl Emitter {
    pub fn new(
        sampler: Arc<dyn MetricsSampler>,
        transport: Arc<dyn TelemetryTransport>,
        sink: Arc<dyn OutcomeSink>,
        metrics: EmitterMetrics,
        factory: PayloadFactory,
        cadences: Cadences,
    ) -> Self {
        Self {
            sampler,
            transport,
            sink,
            metrics,
            factory,
            cadences,
            states: Mutex::new([EmitterState::Idle; 2]),
        }
    }

    pub fn state(&self, data_type: DataType) -> EmitterState {
        let states = self
            .states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match slot(data_type) {
            Some(i) => states[i],
            None => EmitterState::Idle,
        }
    }

    fn transition(&self, data_type: DataType, next: EmitterState) {
        let Some(i) = slot(data_type) else {
            return;
        };
        let mut states = self
            .states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("{} cadence: {:?} -> {:?}", data_type, states[i], next);
        states[i] = next;
    }

    /// Writes the one-off initialization entry.
    pub fn announce(&self) -> OutcomeRecord {
        let record = self.factory.initialization_record();
        if let Err(e) = self.sink.record(&record) {
            error!("Failed to record initialization entry: {:#}", e);
        }
        record
    }

    /// Runs a single tick of the given cadence and returns the recorded entry.
    pub async fn emit_once(&self, data_type: DataType) -> OutcomeRecord {
        self.transition(data_type, EmitterState::Sampling);

        let governance_data = match data_type {
            DataType::Logs => Ok(Some(GovernanceData::Logs(application_log_bundle()))),
            DataType::Metrics => self
                .sampler
                .sample()
                .await
                .map(|snapshot| Some(GovernanceData::Metrics(snapshot))),
            DataType::Initialization => Ok(None),
        };

        let record = match governance_data {
            Err(e) => {
                warn!("Failed to sample {} data: {}", data_type, e);
                self.metrics
                    .sampling_failures_total
                    .with_label_values(&[data_type.as_str()])
                    .inc();
                let payload = self.factory.build(data_type, None);
                OutcomeRecord::failed(payload, e.to_string())
            }
            Ok(governance_data) => {
                let payload = self.factory.build(data_type, governance_data);
                self.transition(data_type, EmitterState::Transmitting);

                let timer = SubmissionTimer::start(
                    self.metrics
                        .submission_latency_seconds
                        .with_label_values(&[data_type.as_str()]),
                );
                let result = self.transport.send(&payload).await;
                debug!("{} submission round trip: {:?}", data_type, timer.finish());

                match result {
                    Ok(response) => {
                        info!("{} data sent successfully: {}", data_type, response);
                        self.metrics
                            .record_submission(data_type.as_str(), "success");
                        OutcomeRecord::succeeded(payload, response)
                    }
                    Err(e) => {
                        error!("Failed to send {} data: {}", data_type, e);
                        self.metrics.record_submission(data_type.as_str(), e.kind());
                        OutcomeRecord::failed(payload, e.to_string())
                    }
                }
            }
        };

        self.transition(data_type, EmitterState::Recording);
        if let Err(e) = self.sink.record(&record) {
            error!("Failed to record {} outcome {}: {:#}", data_type, record.log_id, e);
        }
        self.transition(data_type, EmitterState::Idle);
        record
    }

    /// Runs both cadences until `shutdown` flips to true. Each cadence
    /// finishes its current tick before stopping.
    pub async fn run(self: Arc<Self>, shutdown: watch::Receiver<bool>) {
        info!(
            "Emitter started (metrics every {:?}, logs every {:?})",
            self.cadences.metrics, self.cadences.logs
        );

        let metrics_task = tokio::spawn(self.clone().run_cadence(
            DataType::Metrics,
            self.cadences.metrics,
            shutdown.clone(),
        ));
        let logs_task = tokio::spawn(self.clone().run_cadence(
            DataType::Logs,
            self.cadences.logs,
            shutdown,
        ));

        let (metrics_result, logs_result) = tokio::join!(metrics_task, logs_task);
        for (name, result) in [("metrics", metrics_result), ("logs", logs_result)] {
            if let Err(e) = result {
                error!("{} cadence task ended abnormally: {}", name, e);
            }
        }
        info!("Emitter stopped");
    }

    async fn run_cadence(
        self: Arc<Self>,
        data_type: DataType,
        period: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.emit_once(data_type).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("{} cadence stopped", data_type);
    }
}

fn slot(data_type: DataType) -> Option<usize> {
    match data_type {
        DataType::Metrics => Some(0),
        DataType::Logs => Some(1),
        DataType::Initialization => None,
    }
}
