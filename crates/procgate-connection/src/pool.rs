//! Connection pooling for procedure connections
//!
//! This module provides connection pooling functionality with configurable
//! pool sizes, timeouts, and statistics tracking.
//!
//! # Example
//!
//! ```ignore
//! use procgate_connection::pool::{ConnectionPool, PoolConfig};
//!
//! let config = PoolConfig::new(2, 10)
//!     .with_acquire_timeout_ms(5000)
//!     .with_idle_timeout_ms(300000);
//!
//! let pool = ConnectionPool::new(config, MssqlConnectionFactory::new(db));
//! pool.warm_up().await;
//! let conn = pool.get().await?;
//! let sets = conn.call_procedure("sp_ConsultarBanco", &params).await?;
//! // Connection returned to pool on drop
//! ```

mod config;
mod pool;
mod stats;


pub use config::PoolConfig;
pub use pool::{ConnectionFactory, ConnectionPool, PooledConnection};
pub use stats::PoolStats;
