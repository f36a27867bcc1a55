//! Health-check aggregation engine.
//!
//! [`HealthService`] runs every check held by a [`CheckRegistry`] through
//! [`execute_check`], folds the reports into an [`AggregateStatus`] and raises
//! an alert when a critical dependency is down. Dependencies that can fail
//! repeatedly sit behind a [`CircuitBreaker`].

mod alerts;
mod circuit_breaker;
pub mod checks;
mod errors;
mod executor;
mod metrics;
mod models;
mod registry;
mod service;
mod system_info;

pub use alerts::{mock as alerts_mock, Alert, AlertNotifier, DisabledNotifier, LogNotifier};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT,
};
pub use errors::{CheckError, CircuitBreakerError, NotifierError};
pub use executor::execute_check;
pub use metrics::HealthMetrics;
pub use models::{
    AggregateStatus, CheckCounts, CheckOutcome, CheckReport, CheckStatus, CriticalCheckStatus,
    HealthStatus, LivenessState, LivenessStatus, ReadinessState, ReadinessStatus,
};
pub use registry::{
    check_fn, CheckDefinition, CheckOptions, CheckRegistry, FnCheck, HealthCheck,
    DEFAULT_CHECK_TIMEOUT,
};
pub use service::HealthService;
pub use system_info::{
    CpuSnapshot, DiskSnapshot, HostSystemInfo, MemorySnapshot, ProcessMemory, SystemInfoProvider,
    SystemSnapshot,
};
