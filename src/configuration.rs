use crate::health::checks::DEFAULT_MEMORY_THRESHOLD_PERCENT;
use crate::health::{
    CircuitBreakerConfig, DEFAULT_CHECK_TIMEOUT, DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_host: String,
    pub app_port: u16,
    pub service_name: String,
    pub environment: String,
    pub app_version: String,
    pub health: HealthSettings,
    pub circuit_breaker: CircuitBreakerSettings,
    pub alerts: AlertSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_host: "127.0.0.1".to_string(),
            app_port: 3000,
            service_name: "api-health".to_string(),
            environment: "development".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            health: HealthSettings::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
            alerts: AlertSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Timeout applied to each default check
    pub default_timeout_ms: u64,
    /// Resident set share of total memory above which `memory` reports unhealthy
    pub memory_threshold_percent: f64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_CHECK_TIMEOUT.as_millis() as u64,
            memory_threshold_percent: DEFAULT_MEMORY_THRESHOLD_PERCENT,
        }
    }
}

impl HealthSettings {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT.as_millis() as u64,
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            reset_timeout: Duration::from_millis(settings.reset_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // `configuration.yaml` is optional, APP__* variables override it
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let settings = Settings::default();
        let breaker = CircuitBreakerConfig::from(&settings.circuit_breaker);

        assert_eq!(breaker.failure_threshold, 3);
        assert_eq!(breaker.reset_timeout, Duration::from_millis(10_000));
        assert_eq!(settings.health.default_timeout(), Duration::from_millis(5_000));
        assert_eq!(settings.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "app_port: 8080\nhealth:\n  default_timeout_ms: 250\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.app_port, 8080);
        assert_eq!(settings.health.default_timeout_ms, 250);
        assert_eq!(settings.health.memory_threshold_percent, 80.0);
        assert_eq!(settings.service_name, "api-health");
        assert!(settings.alerts.enabled);
    }
}
