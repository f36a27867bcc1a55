use crate::health::errors::CheckError;
use crate::health::models::{CheckOutcome, CheckStatus};
use crate::health::registry::HealthCheck;
use crate::health::system_info::{ProcessMemory, SystemInfoProvider};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_MEMORY_THRESHOLD_PERCENT: f64 = 80.0;

/// Compares this process's resident set against total host memory.
pub struct MemoryCheck {
    system_info: Arc<dyn SystemInfoProvider>,
    threshold_percent: f64,
}

impl MemoryCheck {
    pub fn new(system_info: Arc<dyn SystemInfoProvider>, threshold_percent: f64) -> Self {
        Self {
            system_info,
            threshold_percent,
        }
    }

    fn classify(memory: ProcessMemory, threshold_percent: f64) -> CheckOutcome {
        let used_percent = memory.used_percent();
        let status = if used_percent < threshold_percent {
            CheckStatus::Healthy
        } else {
            CheckStatus::Unhealthy
        };

        CheckOutcome::with_status(status)
            .with_detail("rss", format!("{}MB", memory.rss_bytes / 1024 / 1024))
            .with_detail("usedPercent", format!("{:.2}%", used_percent))
            .with_field("threshold", format!("{}%", threshold_percent))
    }
}

#[async_trait]
impl HealthCheck for MemoryCheck {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let memory = self.system_info.process_memory().await;
        Ok(Self::classify(memory, self.threshold_percent))
    }
}
