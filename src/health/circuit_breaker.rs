//! Circuit breaker guarding one upstream dependency.
//!
//! ```text
//! CLOSED    -> OPEN       failure_count reaches failure_threshold
//! OPEN      -> HALF_OPEN  first call after reset_timeout since the last failure
//! HALF_OPEN -> CLOSED     trial call succeeds
//! HALF_OPEN -> OPEN       trial call fails
//! ```
//!
//! One instance lives for the whole process and is shared by every caller of
//! the dependency. State transitions happen lazily on `fire`; there is no
//! background timer.

use super::errors::CircuitBreakerError;
use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
    // Set while the single HALF_OPEN trial is outstanding.
    trial_started: Option<Instant>,
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
                trial_started: None,
            }),
        }
    }

    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.lock();
        CircuitBreakerStats {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
        }
    }

    /// Runs `action` through the breaker.
    ///
    /// While OPEN the action is never invoked and `CircuitBreakerError::Open`
    /// is returned. Any error from the action is recorded as a failure and
    /// handed back as `CircuitBreakerError::Failure`.
    pub async fn fire<F, Fut, T, E>(&self, action: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.admit()?;

        match action().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(CircuitBreakerError::Failure(err))
            }
        }
    }

    fn admit<E>(&self) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map(|at| now.duration_since(at))
                    .unwrap_or(Duration::MAX);
                if elapsed >= self.config.reset_timeout {
                    tracing::info!(
                        circuit = %self.name,
                        "Circuit entered HALF_OPEN state, testing connection"
                    );
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_started = Some(now);
                    Ok(())
                } else {
                    Err(self.open_error())
                }
            }
            CircuitState::HalfOpen => {
                // A trial that never reported back stops blocking after reset_timeout.
                let stale = inner
                    .trial_started
                    .map(|at| now.duration_since(at) >= self.config.reset_timeout)
                    .unwrap_or(true);
                if stale {
                    inner.trial_started = Some(now);
                    Ok(())
                } else {
                    Err(self.open_error())
                }
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != CircuitState::Closed {
            tracing::info!(circuit = %self.name, "Circuit CLOSED, service restored");
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.trial_started = None;
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(Instant::now());
        inner.trial_started = None;

        if inner.state == CircuitState::HalfOpen
            || inner.failure_count >= self.config.failure_threshold
        {
            if inner.state != CircuitState::Open {
                tracing::warn!(
                    circuit = %self.name,
                    failure_count = inner.failure_count,
                    "Circuit OPENED, too many failures detected"
                );
            }
            inner.state = CircuitState::Open;
        }
    }

    fn open_error<E>(&self) -> CircuitBreakerError<E> {
        CircuitBreakerError::Open {
            name: self.name.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
