//! Health check functionality for procedure connections
//!
//! # Example
//!
//! ```ignore
//! use procgate_connection::health::{ping_connection, HealthStatus};
//!
//! let latency = ping_connection(&*conn).await?;
//! let status = HealthStatus::from_latency(latency);
//! ```

mod ping;
mod status;


pub use ping::{PingError, PingResult, ping_connection};
pub use status::{HealthStatus, HealthThresholds};
