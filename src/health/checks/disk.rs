use crate::health::errors::CheckError;
use crate::health::models::CheckOutcome;
use crate::health::registry::HealthCheck;
use async_trait::async_trait;

/// Static storage figures; real sampling is exposed through the system snapshot.
pub struct DiskCheck;

#[async_trait]
impl HealthCheck for DiskCheck {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        Ok(CheckOutcome::healthy()
            .with_detail("free", "50GB")
            .with_detail("total", "100GB"))
    }
}
