//! procgate connection - pooling and health checks
//!
//! This crate hands out bounded, reusable procedure connections and measures
//! whether the database behind them is reachable.

pub mod health;
pub mod pool;

pub use health::{HealthStatus, HealthThresholds, PingError, PingResult, ping_connection};
pub use pool::{ConnectionFactory, ConnectionPool, PoolConfig, PoolStats, PooledConnection};
