use super::system_info::SystemSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status reported by a single check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Healthy => "healthy",
            CheckStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Overall status of the system. External layers switch on the string form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// What a check function hands back on success.
///
/// `details` is the structured payload. When it is absent the executor falls
/// back to `fields`, the free-form remainder of the result.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub details: Option<Map<String, Value>>,
    pub fields: Map<String, Value>,
}

impl CheckOutcome {
    pub fn healthy() -> Self {
        Self::with_status(CheckStatus::Healthy)
    }

    pub fn unhealthy() -> Self {
        Self::with_status(CheckStatus::Unhealthy)
    }

    pub fn with_status(status: CheckStatus) -> Self {
        Self {
            status,
            details: None,
            fields: Map::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Payload that ends up in the report.
    pub(crate) fn into_report_details(self) -> Value {
        match self.details {
            Some(details) => Value::Object(details),
            None => Value::Object(self.fields),
        }
    }
}

/// Normalized result of running one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub name: String,
    pub status: CheckStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub critical: bool,
}

impl CheckReport {
    pub fn is_unhealthy(&self) -> bool {
        self.status == CheckStatus::Unhealthy
    }

    pub fn is_critical_failure(&self) -> bool {
        self.critical && self.is_unhealthy()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckCounts {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub critical_failures: usize,
}

/// Snapshot produced by one aggregation run. Never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateStatus {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub checks: CheckCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<CheckReport>>,
}

impl AggregateStatus {
    /// Folds reports into an overall status. A critical failure makes the
    /// result `unhealthy` for good; a non-critical failure can only move
    /// `healthy` to `degraded`.
    pub fn fold(reports: &[CheckReport]) -> (HealthStatus, CheckCounts) {
        let mut status = HealthStatus::Healthy;
        let mut counts = CheckCounts {
            total: reports.len(),
            ..CheckCounts::default()
        };

        for report in reports {
            if !report.is_unhealthy() {
                counts.healthy += 1;
                continue;
            }

            counts.unhealthy += 1;
            if report.critical {
                counts.critical_failures += 1;
                status = HealthStatus::Unhealthy;
            } else if status == HealthStatus::Healthy {
                status = HealthStatus::Degraded;
            }
        }

        (status, counts)
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LivenessState {
    Alive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessStatus {
    pub status: LivenessState,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    Ready,
    NotReady,
}

impl ReadinessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessState::Ready => "ready",
            ReadinessState::NotReady => "not_ready",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalCheckStatus {
    pub name: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessStatus {
    pub status: ReadinessState,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_checks: Option<Vec<CriticalCheckStatus>>,
}

impl ReadinessStatus {
    pub fn is_ready(&self) -> bool {
        self.status == ReadinessState::Ready
    }
}
