//! Connection ping
//!
//! Measures the round trip of the driver's lightweight liveness query.

use std::time::{Duration, Instant};

use procgate_core::{ProcedureConnection, ProcgateError};

/// Result of a ping operation
pub type PingResult = Result<Duration, PingError>;

/// Error that can occur during a ping operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PingError {
    #[error("Connection is closed")]
    ConnectionClosed,
    #[error("Ping query failed: {0}")]
    QueryFailed(String),
    #[error("Ping timed out")]
    Timeout,
}

/// Ping a connection and return the round-trip time.
///
/// # Example
///
/// ```ignore
/// use procgate_connection::health::ping_connection;
///
/// let latency = ping_connection(&*conn).await?;
/// tracing::info!(?latency, "database reachable");
/// ```
pub async fn ping_connection(conn: &dyn ProcedureConnection) -> PingResult {
    if conn.is_closed() {
        return Err(PingError::ConnectionClosed);
    }

    let start = Instant::now();
    match conn.ping().await {
        Ok(()) => Ok(start.elapsed()),
        Err(ProcgateError::Timeout(_)) => Err(PingError::Timeout),
        Err(e) => Err(PingError::QueryFailed(e.to_string())),
    }
}
