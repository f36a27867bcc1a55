use super::models::AggregateStatus;
use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};

/// Prometheus gauges describing the latest aggregation.
///
/// Each render overwrites the gauges, so the text always reflects the status
/// passed in and nothing is remembered between scrapes.
pub struct HealthMetrics {
    registry: Registry,
    service: String,
    health_status: IntGaugeVec,
    uptime_seconds: IntGaugeVec,
    memory_usage_bytes: IntGaugeVec,
    critical_failures: IntGaugeVec,
    checks: IntGaugeVec,
}

impl HealthMetrics {
    pub fn new(service: impl Into<String>) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let health_status = IntGaugeVec::new(
            Opts::new(
                "app_health_status",
                "Application health status (1=healthy, 0=unhealthy)",
            ),
            &["service"],
        )?;
        let uptime_seconds = IntGaugeVec::new(
            Opts::new("app_uptime_seconds", "Application uptime in seconds"),
            &["service"],
        )?;
        let memory_usage_bytes = IntGaugeVec::new(
            Opts::new(
                "app_memory_usage_bytes",
                "Application memory usage in bytes",
            ),
            &["service"],
        )?;
        let critical_failures = IntGaugeVec::new(
            Opts::new(
                "app_health_critical_failures",
                "Critical checks reporting unhealthy",
            ),
            &["service"],
        )?;
        let checks = IntGaugeVec::new(
            Opts::new("app_health_checks", "Health checks by status"),
            &["service", "status"],
        )?;

        registry.register(Box::new(health_status.clone()))?;
        registry.register(Box::new(uptime_seconds.clone()))?;
        registry.register(Box::new(memory_usage_bytes.clone()))?;
        registry.register(Box::new(critical_failures.clone()))?;
        registry.register(Box::new(checks.clone()))?;

        Ok(Self {
            registry,
            service: service.into(),
            health_status,
            uptime_seconds,
            memory_usage_bytes,
            critical_failures,
            checks,
        })
    }

    pub fn render(
        &self,
        status: &AggregateStatus,
        uptime_seconds: u64,
        memory_usage_bytes: u64,
    ) -> Result<String, prometheus::Error> {
        let service = self.service.as_str();

        self.health_status
            .with_label_values(&[service])
            .set(i64::from(status.is_healthy()));
        self.uptime_seconds
            .with_label_values(&[service])
            .set(uptime_seconds as i64);
        self.memory_usage_bytes
            .with_label_values(&[service])
            .set(memory_usage_bytes as i64);
        self.critical_failures
            .with_label_values(&[service])
            .set(status.checks.critical_failures as i64);
        self.checks
            .with_label_values(&[service, "healthy"])
            .set(status.checks.healthy as i64);
        self.checks
            .with_label_values(&[service, "unhealthy"])
            .set(status.checks.unhealthy as i64);

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
