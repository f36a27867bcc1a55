use crate::configuration::Settings;
use crate::health::{HealthService, HealthStatus, ReadinessState};
use actix_web::{get, http::StatusCode, web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;

/// Response body tagged with the service identity.
#[derive(Serialize)]
struct ServiceEnvelope<'a, T: Serialize> {
    #[serde(flatten)]
    body: T,
    service: &'a str,
    environment: &'a str,
}

impl<'a, T: Serialize> ServiceEnvelope<'a, T> {
    fn new(body: T, settings: &'a Settings) -> Self {
        Self {
            body,
            service: &settings.service_name,
            environment: &settings.environment,
        }
    }
}

/// Degraded still serves traffic; only unhealthy maps to 503.
pub fn health_status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn readiness_status_code(status: ReadinessState) -> StatusCode {
    match status {
        ReadinessState::Ready => StatusCode::OK,
        ReadinessState::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[tracing::instrument(name = "Basic health check", skip(service, settings))]
#[get("")]
pub async fn health_check(
    service: web::Data<Arc<HealthService>>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let status = service.get_liveness_status();
    HttpResponse::Ok().json(ServiceEnvelope::new(status, &settings))
}

#[tracing::instrument(name = "Detailed health check", skip(service, settings))]
#[get("/detailed")]
pub async fn detailed_health_check(
    service: web::Data<Arc<HealthService>>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let health = service.get_health_status(true).await;
    HttpResponse::build(health_status_code(health.status))
        .json(ServiceEnvelope::new(health, &settings))
}

#[tracing::instrument(name = "Liveness probe", skip(service))]
#[get("/live")]
pub async fn liveness(service: web::Data<Arc<HealthService>>) -> HttpResponse {
    HttpResponse::Ok().json(service.get_liveness_status())
}

#[tracing::instrument(name = "Readiness probe", skip(service))]
#[get("/ready")]
pub async fn readiness(service: web::Data<Arc<HealthService>>) -> HttpResponse {
    let readiness = service.get_readiness_status().await;
    HttpResponse::build(readiness_status_code(readiness.status)).json(readiness)
}
