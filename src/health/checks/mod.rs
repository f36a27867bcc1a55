//! Checks registered on every service instance.

mod application;
mod database;
mod disk;
mod guarded;
mod memory;
mod redis;

pub use application::ApplicationCheck;
pub use database::DatabasePing;
pub use disk::DiskCheck;
pub use guarded::GuardedCheck;
pub use memory::{MemoryCheck, DEFAULT_MEMORY_THRESHOLD_PERCENT};
pub use redis::RedisCheck;

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use super::registry::{CheckOptions, CheckRegistry};
use super::system_info::SystemInfoProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Inputs the default checks need from the running service.
#[derive(Clone)]
pub struct DefaultCheckContext {
    pub started_at: Instant,
    pub version: String,
    pub timeout: Duration,
    pub memory_threshold_percent: f64,
    pub database_breaker: CircuitBreakerConfig,
    pub system_info: Arc<dyn SystemInfoProvider>,
}

/// Registers `application`, `disk`, `memory`, `database` and `redis`.
///
/// Returns the breaker guarding `database` so callers can inspect it.
pub fn register_defaults(registry: &CheckRegistry, ctx: DefaultCheckContext) -> Arc<CircuitBreaker> {
    registry.register(
        "application",
        Arc::new(ApplicationCheck::new(ctx.started_at, ctx.version.clone())),
        CheckOptions::critical()
            .timeout(ctx.timeout)
            .description("Application basic health"),
    );

    registry.register(
        "disk",
        Arc::new(DiskCheck),
        CheckOptions::default()
            .timeout(ctx.timeout)
            .description("Disk storage monitoring"),
    );

    registry.register(
        "memory",
        Arc::new(MemoryCheck::new(
            ctx.system_info.clone(),
            ctx.memory_threshold_percent,
        )),
        CheckOptions::default()
            .timeout(ctx.timeout)
            .description("Memory usage monitoring"),
    );

    let breaker = Arc::new(CircuitBreaker::new("Database", ctx.database_breaker));
    registry.register(
        "database",
        Arc::new(GuardedCheck::new(breaker.clone(), Arc::new(DatabasePing))),
        CheckOptions::critical()
            .timeout(ctx.timeout)
            .description("Primary PostgreSQL Database"),
    );

    registry.register(
        "redis",
        Arc::new(RedisCheck),
        CheckOptions::default()
            .timeout(ctx.timeout)
            .description("Redis Cache Layer"),
    );

    breaker
}
