use crate::configuration::Settings;
use crate::health::checks::{register_defaults, DefaultCheckContext};
use crate::health::{
    AlertNotifier, CheckRegistry, DisabledNotifier, HealthMetrics, HealthService, HostSystemInfo,
    LogNotifier, SystemInfoProvider,
};
use crate::middleware::{RequestIdRootSpan, RequestTracking};
use crate::routes;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tokio::time::Instant;
use tracing_actix_web::TracingLogger;

/// Creates the process-wide registry with the default checks and the
/// service that aggregates them.
pub fn build_health_service(settings: &Settings) -> HealthService {
    let started_at = Instant::now();
    let system_info: Arc<dyn SystemInfoProvider> = Arc::new(HostSystemInfo::new());

    let notifier: Arc<dyn AlertNotifier> = if settings.alerts.enabled {
        Arc::new(LogNotifier)
    } else {
        tracing::warn!("Alerting disabled - critical failures will only be logged");
        Arc::new(DisabledNotifier)
    };

    let registry = Arc::new(CheckRegistry::new());
    register_defaults(
        &registry,
        DefaultCheckContext {
            started_at,
            version: settings.app_version.clone(),
            timeout: settings.health.default_timeout(),
            memory_threshold_percent: settings.health.memory_threshold_percent,
            database_breaker: (&settings.circuit_breaker).into(),
            system_info: system_info.clone(),
        },
    );

    HealthService::with_start_time(registry, system_info, notifier, started_at)
}

pub async fn run(listener: TcpListener, settings: Settings) -> Result<Server, std::io::Error> {
    let health_service = Arc::new(build_health_service(&settings));
    run_with_service(listener, settings, health_service).await
}

pub async fn run_with_service(
    listener: TcpListener,
    settings: Settings,
    health_service: Arc<HealthService>,
) -> Result<Server, std::io::Error> {
    let health_metrics = HealthMetrics::new(settings.service_name.clone())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let health_metrics = web::Data::new(Arc::new(health_metrics));
    let health_service = web::Data::new(health_service);
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::<RequestIdRootSpan>::new())
            .wrap(RequestTracking)
            .app_data(health_service.clone())
            .app_data(health_metrics.clone())
            .app_data(settings.clone())
            .service(
                web::scope("/health")
                    .service(routes::health_check)
                    .service(routes::detailed_health_check),
            )
            .service(routes::liveness)
            .service(routes::readiness)
            .service(routes::prometheus_metrics)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
