//! Host metrics sampling via `sysinfo`.

use crate::domain::errors::SamplingError;
use crate::domain::ports::MetricsSampler;
use crate::domain::telemetry::MetricsSnapshot;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, Networks, System};
use tokio::sync::Mutex;

pub struct SysinfoSampler {
    system: Mutex<System>,
    cpu_window: Duration,
    disk_mount: PathBuf,
}

impl SysinfoSampler {
    /// `cpu_window` is how long CPU usage is measured over; it is raised to
    /// the minimum interval `sysinfo` needs between two CPU refreshes.
    pub fn new(cpu_window: Duration) -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();

        Self {
            system: Mutex::new(system),
            cpu_window: cpu_window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            disk_mount: PathBuf::from("/"),
        }
    }

    pub fn with_disk_mount(mut self, mount: impl Into<PathBuf>) -> Self {
        self.disk_mount = mount.into();
        self
    }
}

fn percent(part: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| (part as f64 / total as f64 * 1000.0).round() / 10.0)
}

fn disk_usage(mount: &Path) -> Option<f64> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .find(|d| d.mount_point() == mount)
        .and_then(|d| {
            let used = d.total_space().saturating_sub(d.available_space());
            percent(used, d.total_space())
        })
}

#[async_trait]
impl MetricsSampler for SysinfoSampler {
    async fn sample(&self) -> Result<MetricsSnapshot, SamplingError> {
        let mut system = self.system.lock().await;

        // CPU usage is the delta between two refreshes
        system.refresh_cpu_usage();
        tokio::time::sleep(self.cpu_window).await;
        system.refresh_cpu_usage();
        system.refresh_memory();

        let memory_usage = percent(system.used_memory(), system.total_memory()).ok_or_else(|| {
            SamplingError::Unavailable {
                reason: "total memory reported as zero".to_string(),
            }
        })?;
        let cpu_usage = (f64::from(system.global_cpu_usage()) * 10.0).round() / 10.0;
        drop(system);

        let disk_usage = disk_usage(&self.disk_mount).ok_or_else(|| SamplingError::Unavailable {
            reason: format!("no disk mounted at {}", self.disk_mount.display()),
        })?;

        let networks = Networks::new_with_refreshed_list();
        let (bytes_sent, bytes_recv) = networks
            .list()
            .values()
            .fold((0u64, 0u64), |(sent, recv), data| {
                (
                    sent.saturating_add(data.total_transmitted()),
                    recv.saturating_add(data.total_received()),
                )
            });

        Ok(MetricsSnapshot {
            memory_usage,
            cpu_usage,
            disk_usage,
            bytes_sent,
            bytes_recv,
            additional_metric_1: "value_1".to_string(),
            additional_metric_2: "value_2".to_string(),
        })
    }
}
