use async_trait::async_trait;
use health_monitor::health::{
    alerts_mock::ChannelNotifier, check_fn, Alert, CheckError, CheckOptions, CheckOutcome,
    CheckRegistry, CheckStatus, CpuSnapshot, DiskSnapshot, HealthService, HealthStatus,
    MemorySnapshot, ProcessMemory, ReadinessState, SystemInfoProvider, SystemSnapshot,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct StaticSystemInfo;

#[async_trait]
impl SystemInfoProvider for StaticSystemInfo {
    async fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            hostname: "node-1".to_string(),
            platform: "linux".to_string(),
            architecture: "x86_64".to_string(),
            process_id: 42,
            uptime_seconds: 3600,
            memory: MemorySnapshot {
                total_bytes: 8 << 30,
                free_bytes: 4 << 30,
                used_percent: 50.0,
            },
            cpu: CpuSnapshot {
                count: 8,
                model: "virtual".to_string(),
                speed_mhz: 2400,
            },
            disk: DiskSnapshot {
                total_bytes: 100 << 30,
                free_bytes: 50 << 30,
            },
        }
    }

    async fn process_memory(&self) -> ProcessMemory {
        ProcessMemory {
            rss_bytes: 64 << 20,
            total_bytes: 8 << 30,
        }
    }
}

fn healthy() -> Arc<dyn health_monitor::health::HealthCheck> {
    check_fn(|| async { Ok(CheckOutcome::healthy()) })
}

fn failing() -> Arc<dyn health_monitor::health::HealthCheck> {
    check_fn(|| async { Err(CheckError::execution("connection refused")) })
}

fn hanging() -> Arc<dyn health_monitor::health::HealthCheck> {
    check_fn(|| async {
        std::future::pending::<()>().await;
        Ok(CheckOutcome::healthy())
    })
}

fn service(registry: CheckRegistry) -> (HealthService, UnboundedReceiver<Alert>) {
    let (notifier, alerts) = ChannelNotifier::new();
    let service = HealthService::new(
        Arc::new(registry),
        Arc::new(StaticSystemInfo),
        Arc::new(notifier),
    );
    (service, alerts)
}

async fn next_alert(alerts: &mut UnboundedReceiver<Alert>) -> Option<Alert> {
    tokio::time::timeout(Duration::from_secs(1), alerts.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn non_critical_failure_degrades() {
    let registry = CheckRegistry::new();
    registry.register("app", healthy(), CheckOptions::critical());
    registry.register(
        "cache",
        check_fn(|| async { Ok(CheckOutcome::unhealthy()) }),
        CheckOptions::default(),
    );
    let (service, mut alerts) = service(registry);

    let status = service.get_health_status(false).await;

    assert_eq!(status.status, HealthStatus::Degraded);
    assert_eq!(status.checks.critical_failures, 0);
    assert_eq!(status.checks.unhealthy, 1);
    assert_eq!(status.checks.healthy, 1);
    assert!(alerts.try_recv().is_err());
}

#[tokio::test]
async fn critical_failure_is_unhealthy_and_alerts_once() {
    let registry = CheckRegistry::new();
    registry.register("app", failing(), CheckOptions::critical());
    registry.register("cache", healthy(), CheckOptions::default());
    let (service, mut alerts) = service(registry);

    let status = service.get_health_status(false).await;

    assert_eq!(status.status, HealthStatus::Unhealthy);
    assert_eq!(status.checks.critical_failures, 1);

    let alert = next_alert(&mut alerts).await.expect("alert was not sent");
    assert_eq!(alert.message, "Critical Systems Offline");
    assert_eq!(alert.critical_failures, 1);

    tokio::task::yield_now().await;
    assert!(alerts.try_recv().is_err());
}

#[tokio::test]
async fn critical_failure_outweighs_any_number_of_healthy_checks() {
    let registry = CheckRegistry::new();
    for i in 0..10 {
        registry.register(format!("ok-{}", i), healthy(), CheckOptions::default());
    }
    registry.register("db", failing(), CheckOptions::critical());
    let (service, _alerts) = service(registry);

    let status = service.get_health_status(false).await;
    assert_eq!(status.status, HealthStatus::Unhealthy);
    assert_eq!(status.checks.total, 11);
}

#[tokio::test]
async fn critical_failures_count_matches_reports() {
    let registry = CheckRegistry::new();
    registry.register("a", failing(), CheckOptions::critical());
    registry.register("b", failing(), CheckOptions::default());
    registry.register("c", healthy(), CheckOptions::critical());
    registry.register("d", failing(), CheckOptions::critical());
    registry.register(
        "e",
        check_fn(|| async { Ok(CheckOutcome::unhealthy()) }),
        CheckOptions::default(),
    );
    let (service, _alerts) = service(registry);

    let status = service.get_health_status(true).await;
    let reports = status.details.as_ref().unwrap();

    let expected = reports
        .iter()
        .filter(|r| r.critical && r.status == CheckStatus::Unhealthy)
        .count();
    assert_eq!(status.checks.critical_failures, expected);
    assert_eq!(expected, 2);
    assert_eq!(status.checks.unhealthy, 4);
    assert_eq!(status.status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn all_healthy_is_healthy() {
    let registry = CheckRegistry::new();
    registry.register("app", healthy(), CheckOptions::critical());
    registry.register("cache", healthy(), CheckOptions::default());
    let (service, mut alerts) = service(registry);

    let status = service.get_health_status(true).await;
    assert_eq!(status.status, HealthStatus::Healthy);
    assert_eq!(status.checks.healthy, 2);
    assert!(status.system.is_some());
    assert!(alerts.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn hanging_checks_time_out_in_parallel() {
    let registry = CheckRegistry::new();
    registry.register(
        "slow-a",
        hanging(),
        CheckOptions::default().timeout(Duration::from_millis(300)),
    );
    registry.register(
        "slow-b",
        hanging(),
        CheckOptions::default().timeout(Duration::from_millis(500)),
    );
    registry.register("fast", healthy(), CheckOptions::critical());
    let (service, _alerts) = service(registry);

    let start = tokio::time::Instant::now();
    let status = service.get_health_status(true).await;
    let elapsed = start.elapsed();

    // Bounded by the largest timeout, not their sum.
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(800));

    assert_eq!(status.status, HealthStatus::Degraded);
    let reports = status.details.unwrap();
    assert_eq!(reports[0].name, "slow-a");
    assert_eq!(reports[0].error.as_deref(), Some("Health check timeout"));
    assert_eq!(reports[1].error.as_deref(), Some("Health check timeout"));
    assert_eq!(reports[2].status, CheckStatus::Healthy);
}

#[tokio::test]
async fn readiness_without_critical_checks_is_ready() {
    let registry = CheckRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    registry.register(
        "cache",
        check_fn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(CheckOutcome::unhealthy())
            }
        }),
        CheckOptions::default(),
    );
    let (service, _alerts) = service(registry);

    let readiness = service.get_readiness_status().await;
    assert_eq!(readiness.status, ReadinessState::Ready);
    assert!(readiness.critical_checks.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn readiness_fails_on_critical_failure() {
    let registry = CheckRegistry::new();
    registry.register("app", healthy(), CheckOptions::critical());
    registry.register("db", failing(), CheckOptions::critical());
    let (service, _alerts) = service(registry);

    let readiness = service.get_readiness_status().await;
    assert_eq!(readiness.status, ReadinessState::NotReady);
    let checks = readiness.critical_checks.unwrap();
    assert_eq!(checks[1].name, "db");
    assert_eq!(checks[1].status, CheckStatus::Unhealthy);
}

#[tokio::test]
async fn failing_notifier_does_not_change_status() {
    let registry = CheckRegistry::new();
    registry.register("app", failing(), CheckOptions::critical());
    let (notifier, mut alerts) = ChannelNotifier::failing();
    let service = HealthService::new(
        Arc::new(registry),
        Arc::new(StaticSystemInfo),
        Arc::new(notifier),
    );

    let status = service.get_health_status(false).await;
    assert_eq!(status.status, HealthStatus::Unhealthy);
    assert!(next_alert(&mut alerts).await.is_some());
}

#[tokio::test]
async fn lean_and_detailed_payloads_serialize_differently() {
    let registry = CheckRegistry::new();
    registry.register("app", healthy(), CheckOptions::critical());
    let (service, _alerts) = service(registry);

    let lean = serde_json::to_value(service.get_health_status(false).await).unwrap();
    assert!(lean.get("system").is_none());
    assert!(lean.get("details").is_none());
    assert_eq!(lean["status"], "healthy");

    let detailed = serde_json::to_value(service.get_health_status(true).await).unwrap();
    assert_eq!(detailed["system"]["hostname"], "node-1");
    assert_eq!(detailed["details"][0]["name"], "app");
    assert_eq!(detailed["details"][0]["critical"], true);
}
