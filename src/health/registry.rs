use super::errors::CheckError;
use super::models::CheckOutcome;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_millis(5_000);

/// A single health probe.
///
/// Implementations run on a detached task. If the executor gives up on them
/// after the timeout they keep running, so releasing whatever they hold is up
/// to the implementation.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<CheckOutcome, CheckError>;
}

/// Adapts an async closure into a [`HealthCheck`].
pub struct FnCheck<F>(F);

#[async_trait]
impl<F, Fut> HealthCheck for FnCheck<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<CheckOutcome, CheckError>> + Send,
{
    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        (self.0)().await
    }
}

pub fn check_fn<F, Fut>(f: F) -> Arc<dyn HealthCheck>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CheckOutcome, CheckError>> + Send + 'static,
{
    Arc::new(FnCheck(f))
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub timeout: Duration,
    pub critical: bool,
    pub description: Option<String>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CHECK_TIMEOUT,
            critical: false,
            description: None,
        }
    }
}

impl CheckOptions {
    pub fn critical() -> Self {
        Self {
            critical: true,
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone)]
pub struct CheckDefinition {
    pub name: String,
    pub check: Arc<dyn HealthCheck>,
    pub timeout: Duration,
    pub critical: bool,
    pub description: String,
}

impl std::fmt::Debug for CheckDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("critical", &self.critical)
            .field("description", &self.description)
            .finish()
    }
}

/// Named check definitions in registration order.
///
/// Registering an existing name replaces its definition in place.
#[derive(Default)]
pub struct CheckRegistry {
    checks: RwLock<IndexMap<String, CheckDefinition>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, check: Arc<dyn HealthCheck>, options: CheckOptions) {
        let name = name.into();
        let definition = CheckDefinition {
            description: options
                .description
                .unwrap_or_else(|| format!("Health check for {}", name)),
            name: name.clone(),
            check,
            timeout: options.timeout,
            critical: options.critical,
        };

        tracing::info!(check = %name, critical = definition.critical, "Registered health check");
        self.checks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, definition);
    }

    /// Snapshot of every definition, in registration order.
    pub fn list(&self) -> Vec<CheckDefinition> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn critical(&self) -> Vec<CheckDefinition> {
        self.list().into_iter().filter(|def| def.critical).collect()
    }

    pub fn get(&self, name: &str) -> Option<CheckDefinition> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.checks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> Arc<dyn HealthCheck> {
        check_fn(|| async { Ok(CheckOutcome::healthy()) })
    }

    #[test]
    fn test_register_applies_defaults() {
        let registry = CheckRegistry::new();
        registry.register("cache", healthy(), CheckOptions::default());

        let def = registry.get("cache").unwrap();
        assert_eq!(def.timeout, Duration::from_millis(5_000));
        assert!(!def.critical);
        assert_eq!(def.description, "Health check for cache");
    }

    #[test]
    fn test_reregistration_overwrites_and_keeps_position() {
        let registry = CheckRegistry::new();
        registry.register("a", healthy(), CheckOptions::default());
        registry.register("b", healthy(), CheckOptions::default());
        registry.register(
            "a",
            healthy(),
            CheckOptions::critical().description("replaced"),
        );

        let names: Vec<_> = registry.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.len(), 2);

        let a = registry.get("a").unwrap();
        assert!(a.critical);
        assert_eq!(a.description, "replaced");
    }

    #[test]
    fn test_critical_filter() {
        let registry = CheckRegistry::new();
        registry.register("app", healthy(), CheckOptions::critical());
        registry.register("cache", healthy(), CheckOptions::default());

        let critical: Vec<_> = registry.critical().into_iter().map(|d| d.name).collect();
        assert_eq!(critical, vec!["app"]);
    }
}
