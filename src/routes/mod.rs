mod health;
mod metrics;

pub use health::*;
pub use metrics::*;
