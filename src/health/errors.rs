use std::time::Duration;

/// Ways a single check can fail. The executor turns every one of these into
/// an `unhealthy` report; none of them escape the aggregation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("Health check timeout")]
    Timeout { timeout: Duration },
    #[error("{0}")]
    Execution(String),
    #[error("Circuit {name} is OPEN. Request aborted to prevent system overload.")]
    CircuitOpen { name: String },
}

impl CheckError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Execution(_) => "execution",
            Self::CircuitOpen { .. } => "circuit_open",
        }
    }
}

impl From<anyhow::Error> for CheckError {
    fn from(err: anyhow::Error) -> Self {
        Self::Execution(err.to_string())
    }
}

/// Error returned by [`CircuitBreaker::fire`](super::CircuitBreaker::fire).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CircuitBreakerError<E> {
    /// The call was rejected without invoking the action.
    #[error("Circuit {name} is OPEN. Request aborted to prevent system overload.")]
    Open { name: String },
    /// The action ran and failed.
    #[error(transparent)]
    Failure(E),
}

impl From<CircuitBreakerError<CheckError>> for CheckError {
    fn from(err: CircuitBreakerError<CheckError>) -> Self {
        match err {
            CircuitBreakerError::Open { name } => CheckError::CircuitOpen { name },
            CircuitBreakerError::Failure(inner) => inner,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),
}
