use crate::health::circuit_breaker::CircuitBreaker;
use crate::health::errors::CheckError;
use crate::health::models::{CheckOutcome, CheckStatus};
use crate::health::registry::HealthCheck;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs a dependency check through its circuit breaker.
///
/// An outcome that reports `unhealthy` counts as a breaker failure, so a
/// dependency that answers but is sick still trips the circuit.
pub struct GuardedCheck {
    breaker: Arc<CircuitBreaker>,
    inner: Arc<dyn HealthCheck>,
}

impl GuardedCheck {
    pub fn new(breaker: Arc<CircuitBreaker>, inner: Arc<dyn HealthCheck>) -> Self {
        Self { breaker, inner }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl HealthCheck for GuardedCheck {
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let inner = self.inner.clone();
        let name = self.breaker.name().to_string();

        let outcome = self
            .breaker
            .fire(|| async move {
                let outcome = inner.check().await?;
                match outcome.status {
                    CheckStatus::Healthy => Ok::<_, CheckError>(outcome),
                    CheckStatus::Unhealthy => Err(CheckError::execution(format!(
                        "{} reported unhealthy",
                        name
                    ))),
                }
            })
            .await?;

        Ok(outcome)
    }
}
