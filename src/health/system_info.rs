//! Host and process resource sampling.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sysinfo::{Disks, ProcessesToUpdate, System};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemorySnapshot {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CpuSnapshot {
    pub count: usize,
    pub model: String,
    pub speed_mhz: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiskSnapshot {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSnapshot {
    pub hostname: String,
    pub platform: String,
    pub architecture: String,
    pub process_id: u32,
    pub uptime_seconds: u64,
    pub memory: MemorySnapshot,
    pub cpu: CpuSnapshot,
    pub disk: DiskSnapshot,
}

impl SystemSnapshot {
    /// Placeholder reported when the host could not be sampled.
    pub fn unavailable() -> Self {
        Self {
            hostname: "unknown".to_string(),
            platform: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            process_id: std::process::id(),
            uptime_seconds: 0,
            memory: MemorySnapshot {
                total_bytes: 0,
                free_bytes: 0,
                used_percent: 0.0,
            },
            cpu: CpuSnapshot {
                count: 0,
                model: "Unknown".to_string(),
                speed_mhz: 0,
            },
            disk: DiskSnapshot {
                total_bytes: 0,
                free_bytes: 0,
            },
        }
    }
}

/// Resident set size of this process against total host memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessMemory {
    pub rss_bytes: u64,
    pub total_bytes: u64,
}

impl ProcessMemory {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.rss_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

#[async_trait]
pub trait SystemInfoProvider: Send + Sync {
    async fn snapshot(&self) -> SystemSnapshot;

    async fn process_memory(&self) -> ProcessMemory;
}

/// Samples the live host through `sysinfo` on the blocking pool.
#[derive(Debug, Default)]
pub struct HostSystemInfo;

impl HostSystemInfo {
    pub fn new() -> Self {
        Self
    }

    fn sample_snapshot() -> SystemSnapshot {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let total = sys.total_memory();
        let free = sys.available_memory();
        let used_percent = if total == 0 {
            0.0
        } else {
            (total.saturating_sub(free)) as f64 / total as f64 * 100.0
        };

        let (model, speed_mhz) = sys
            .cpus()
            .first()
            .map(|cpu| (cpu.brand().to_string(), cpu.frequency()))
            .unwrap_or_else(|| ("Unknown".to_string(), 0));

        let disks = Disks::new_with_refreshed_list();
        let disk = disks.list().iter().fold(
            DiskSnapshot {
                total_bytes: 0,
                free_bytes: 0,
            },
            |acc, disk| DiskSnapshot {
                total_bytes: acc.total_bytes + disk.total_space(),
                free_bytes: acc.free_bytes + disk.available_space(),
            },
        );

        SystemSnapshot {
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            platform: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            process_id: std::process::id(),
            uptime_seconds: System::uptime(),
            memory: MemorySnapshot {
                total_bytes: total,
                free_bytes: free,
                used_percent,
            },
            cpu: CpuSnapshot {
                count: sys.cpus().len(),
                model,
                speed_mhz,
            },
            disk,
        }
    }

    fn sample_process_memory() -> ProcessMemory {
        let mut sys = System::new();
        sys.refresh_memory();

        let rss_bytes = match sysinfo::get_current_pid() {
            Ok(pid) => {
                sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                sys.process(pid).map(|process| process.memory()).unwrap_or(0)
            }
            Err(err) => {
                tracing::warn!(error = err, "Unable to resolve current pid");
                0
            }
        };

        ProcessMemory {
            rss_bytes,
            total_bytes: sys.total_memory(),
        }
    }
}

#[async_trait]
impl SystemInfoProvider for HostSystemInfo {
    async fn snapshot(&self) -> SystemSnapshot {
        match tokio::task::spawn_blocking(Self::sample_snapshot).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(error = %err, "System snapshot task failed");
                SystemSnapshot::unavailable()
            }
        }
    }

    async fn process_memory(&self) -> ProcessMemory {
        match tokio::task::spawn_blocking(Self::sample_process_memory).await {
            Ok(memory) => memory,
            Err(err) => {
                tracing::error!(error = %err, "Process memory task failed");
                ProcessMemory {
                    rss_bytes: 0,
                    total_bytes: 0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percent() {
        let memory = ProcessMemory {
            rss_bytes: 25,
            total_bytes: 100,
        };
        assert!((memory.used_percent() - 25.0).abs() < f64::EPSILON);

        let empty = ProcessMemory {
            rss_bytes: 10,
            total_bytes: 0,
        };
        assert_eq!(empty.used_percent(), 0.0);
    }

    #[test]
    fn test_unavailable_snapshot_is_zeroed() {
        let snapshot = SystemSnapshot::unavailable();
        assert_eq!(snapshot.hostname, "unknown");
        assert_eq!(snapshot.process_id, std::process::id());
        assert_eq!(snapshot.memory.total_bytes, 0);
        assert_eq!(snapshot.cpu.count, 0);
        assert_eq!(snapshot.disk.free_bytes, 0);
    }

    #[tokio::test]
    async fn test_host_snapshot_reports_process() {
        let snapshot = HostSystemInfo::new().snapshot().await;
        assert_eq!(snapshot.process_id, std::process::id());
        assert_eq!(snapshot.platform, std::env::consts::OS);
        assert!(snapshot.memory.total_bytes > 0);
    }
}
