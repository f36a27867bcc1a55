use crate::health::errors::CheckError;
use crate::health::models::CheckOutcome;
use crate::health::registry::HealthCheck;
use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

/// Always healthy while the process can answer; reports uptime and version.
pub struct ApplicationCheck {
    started_at: Instant,
    version: String,
}

impl ApplicationCheck {
    pub fn new(started_at: Instant, version: String) -> Self {
        Self {
            started_at,
            version,
        }
    }
}

#[async_trait]
impl HealthCheck for ApplicationCheck {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        Ok(CheckOutcome::healthy()
            .with_field("timestamp", Utc::now().to_rfc3339())
            .with_field("uptime_seconds", self.started_at.elapsed().as_secs())
            .with_field("version", self.version.clone()))
    }
}
