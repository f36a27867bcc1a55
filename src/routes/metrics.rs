use crate::health::{HealthMetrics, HealthService};
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Prometheus metrics", skip(service, metrics))]
#[get("/metrics")]
pub async fn prometheus_metrics(
    service: web::Data<Arc<HealthService>>,
    metrics: web::Data<Arc<HealthMetrics>>,
) -> HttpResponse {
    let health = service.get_health_status(false).await;
    let memory = service.system_info().process_memory().await;

    match metrics.render(&health, service.uptime_seconds(), memory.rss_bytes) {
        Ok(body) => HttpResponse::Ok()
            .content_type(metrics.content_type())
            .body(body),
        Err(err) => {
            tracing::error!(error = %err, "Metrics endpoint failed");
            HttpResponse::InternalServerError()
                .content_type("text/plain")
                .body("# Error generating metrics")
        }
    }
}
