//! Health status classification

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ping::PingResult;

/// Health of the database behind the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Reachable with good latency
    #[default]
    Healthy,
    /// Reachable but slow
    Degraded,
    /// Unreachable, failing, or very slow
    Unhealthy,
}

impl HealthStatus {
    /// Classify a latency with the default thresholds.
    ///
    /// ```
    /// use procgate_connection::health::HealthStatus;
    /// use std::time::Duration;
    ///
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(50)), HealthStatus::Healthy);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_millis(200)), HealthStatus::Degraded);
    /// assert_eq!(HealthStatus::from_latency(Duration::from_secs(1)), HealthStatus::Unhealthy);
    /// ```
    pub fn from_latency(latency: Duration) -> Self {
        HealthThresholds::default().classify(latency)
    }

    /// Classify a ping outcome; any ping error is unhealthy
    pub fn from_ping(result: &PingResult, thresholds: &HealthThresholds) -> Self {
        match result {
            Ok(latency) => thresholds.classify(*latency),
            Err(_) => HealthStatus::Unhealthy,
        }
    }

    /// Both `Healthy` and `Degraded` can serve requests
    pub fn is_usable(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latency limits for health classification, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// Highest latency still considered healthy
    pub healthy_ms: u64,
    /// Highest latency still considered degraded
    pub degraded_ms: u64,
}

impl HealthThresholds {
    /// `degraded_ms` is raised to `healthy_ms` when smaller
    pub fn new(healthy_ms: u64, degraded_ms: u64) -> Self {
        Self {
            healthy_ms,
            degraded_ms: degraded_ms.max(healthy_ms),
        }
    }

    /// Classify a latency against these limits (both inclusive)
    pub fn classify(&self, latency: Duration) -> HealthStatus {
        if latency <= Duration::from_millis(self.healthy_ms) {
            HealthStatus::Healthy
        } else if latency <= Duration::from_millis(self.degraded_ms) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        }
    }
}

impl Default for HealthThresholds {
    /// healthy up to 100ms, degraded up to 500ms
    fn default() -> Self {
        Self::new(100, 500)
    }
}
