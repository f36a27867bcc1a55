pub mod configuration;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;
