use prometheus::Histogram;
use std::time::{Duration, Instant};

/// Times one gateway submission into a `data_type` series of
/// `govtrace_submission_latency_seconds`.
///
/// A timer records exactly once: on `finish`, or on drop if the send future
/// was cancelled before it completed.
pub struct SubmissionTimer {
    started: Instant,
    series: Option<Histogram>,
}

impl SubmissionTimer {
    pub fn start(series: Histogram) -> Self {
        Self {
            started: Instant::now(),
            series: Some(series),
        }
    }

    /// Records the round trip and returns it.
    pub fn finish(mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if let Some(series) = self.series.take() {
            series.observe(elapsed.as_secs_f64());
        }
        elapsed
    }
}

impl Drop for SubmissionTimer {
    fn drop(&mut self) {
        if let Some(series) = self.series.take() {
            series.observe(self.started.elapsed().as_secs_f64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::observability::EmitterMetrics;

    #[test]
    fn test_finish_records_once_per_submission() {
        let metrics = EmitterMetrics::new().unwrap();
        let logs = metrics.submission_latency_seconds.with_label_values(&["logs"]);

        let timer = SubmissionTimer::start(logs.clone());
        std::thread::sleep(Duration::from_millis(5));
        let elapsed = timer.finish();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(logs.get_sample_count(), 1);
        assert!((logs.get_sample_sum() - elapsed.as_secs_f64()).abs() < 1e-9);

        let other = metrics.submission_latency_seconds.with_label_values(&["metrics"]);
        assert_eq!(other.get_sample_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_send_is_still_recorded() {
        let metrics = EmitterMetrics::new().unwrap();
        let series = metrics.submission_latency_seconds.with_label_values(&["metrics"]);

        let send = async {
            let _timer = SubmissionTimer::start(series.clone());
            std::future::pending::<()>().await;
        };
        let timed_out = tokio::time::timeout(Duration::from_millis(10), send).await;

        assert!(timed_out.is_err());
        assert_eq!(series.get_sample_count(), 1);
    }
}
