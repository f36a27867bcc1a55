use super::alerts::{Alert, AlertNotifier};
use super::executor::execute_check;
use super::models::{
    AggregateStatus, CheckReport, CheckStatus, CriticalCheckStatus, HealthStatus, LivenessState,
    LivenessStatus, ReadinessState, ReadinessStatus,
};
use super::registry::{CheckDefinition, CheckRegistry};
use super::system_info::SystemInfoProvider;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::time::Instant;

const CRITICAL_ALERT_MESSAGE: &str = "Critical Systems Offline";

/// Runs registered checks and folds them into one status.
pub struct HealthService {
    registry: Arc<CheckRegistry>,
    system_info: Arc<dyn SystemInfoProvider>,
    notifier: Arc<dyn AlertNotifier>,
    started_at: Instant,
}

impl HealthService {
    pub fn new(
        registry: Arc<CheckRegistry>,
        system_info: Arc<dyn SystemInfoProvider>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        Self::with_start_time(registry, system_info, notifier, Instant::now())
    }

    pub fn with_start_time(
        registry: Arc<CheckRegistry>,
        system_info: Arc<dyn SystemInfoProvider>,
        notifier: Arc<dyn AlertNotifier>,
        started_at: Instant,
    ) -> Self {
        Self {
            registry,
            system_info,
            notifier,
            started_at,
        }
    }

    pub fn registry(&self) -> &Arc<CheckRegistry> {
        &self.registry
    }

    pub fn system_info(&self) -> &Arc<dyn SystemInfoProvider> {
        &self.system_info
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Runs every registered check concurrently and folds the reports.
    ///
    /// With `detailed` the per-check reports and a system snapshot are
    /// attached; without it both are left out.
    #[tracing::instrument(name = "Aggregate health status", skip(self))]
    pub async fn get_health_status(&self, detailed: bool) -> AggregateStatus {
        let start = Instant::now();
        let definitions = self.registry.list();

        let reports = run_all(&definitions).await;
        let (status, counts) = AggregateStatus::fold(&reports);
        let duration_ms = start.elapsed().as_millis() as u64;

        if status == HealthStatus::Unhealthy && counts.critical_failures > 0 {
            self.dispatch_alert(Alert {
                message: CRITICAL_ALERT_MESSAGE.to_string(),
                critical_failures: counts.critical_failures,
                duration_ms,
            });
        }

        let (system, details) = if detailed {
            (Some(self.system_info.snapshot().await), Some(reports))
        } else {
            (None, None)
        };

        tracing::info!(
            status = status.as_str(),
            duration_ms,
            critical_failures = counts.critical_failures,
            "Health check completed"
        );

        AggregateStatus {
            status,
            timestamp: Utc::now(),
            duration_ms,
            checks: counts,
            system,
            details,
        }
    }

    /// Answers without running any check.
    pub fn get_liveness_status(&self) -> LivenessStatus {
        LivenessStatus {
            status: LivenessState::Alive,
            timestamp: Utc::now(),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    /// Ready unless a critical check reports unhealthy.
    #[tracing::instrument(name = "Aggregate readiness status", skip(self))]
    pub async fn get_readiness_status(&self) -> ReadinessStatus {
        let critical = self.registry.critical();
        if critical.is_empty() {
            return ReadinessStatus {
                status: ReadinessState::Ready,
                timestamp: Utc::now(),
                critical_checks: None,
            };
        }

        let reports = run_all(&critical).await;
        let not_ready = reports.iter().any(|r| r.status == CheckStatus::Unhealthy);

        ReadinessStatus {
            status: if not_ready {
                ReadinessState::NotReady
            } else {
                ReadinessState::Ready
            },
            timestamp: Utc::now(),
            critical_checks: Some(
                reports
                    .into_iter()
                    .map(|r| CriticalCheckStatus {
                        name: r.name,
                        status: r.status,
                    })
                    .collect(),
            ),
        }
    }

    fn dispatch_alert(&self, alert: Alert) {
        tracing::error!(
            critical_failures = alert.critical_failures,
            duration_ms = alert.duration_ms,
            "ALERT TRIGGERED: {}",
            alert.message
        );

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.send_alert(&alert).await {
                tracing::error!(error = %err, "Failed to deliver alert");
            }
        });
    }
}

// Reports come back in the order of `definitions`, whatever order the checks finish in.
async fn run_all(definitions: &[CheckDefinition]) -> Vec<CheckReport> {
    join_all(
        definitions
            .iter()
            .map(|definition| execute_check(&definition.name, definition)),
    )
    .await
}
