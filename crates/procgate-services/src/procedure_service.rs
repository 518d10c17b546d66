//! Procedure invocation service
//!
//! Every call goes through the same steps: the name is checked against the
//! allow-list before any connection is touched, parameters are coerced into
//! native values, the procedure runs on a pooled connection and all of its
//! result sets come back in order.

use std::sync::Arc;
use std::time::Instant;

use procgate_connection::{
    ConnectionPool, HealthStatus, HealthThresholds, PoolStats, ping_connection,
};
use procgate_core::{ParamMap, ProcgateError, ResultSets};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::allowlist::AllowList;
use crate::error::{ServiceError, ServiceResult};
use crate::status::ProcedureStatus;

/// A procedure call as received from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcedureRequest {
    #[serde(default)]
    pub procedure: String,
    #[serde(default, alias = "params")]
    pub parameters: Option<Map<String, JsonValue>>,
}

/// Result of a successful procedure call
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureResponse {
    /// Allow-listed spelling of the procedure that ran
    pub procedure: String,
    /// One array of row objects per result set
    pub results: ResultSets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProcedureStatus>,
}

impl ProcedureResponse {
    /// Whether the procedure itself reported a failure
    pub fn reported_error(&self) -> bool {
        self.status.as_ref().is_some_and(ProcedureStatus::is_error)
    }
}

/// Database reachability as seen through the pool
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub latency_ms: Option<u64>,
    pub pool: PoolStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs allow-listed stored procedures on pooled connections
pub struct ProcedureService {
    pool: Arc<ConnectionPool>,
    allow_list: Arc<AllowList>,
    thresholds: HealthThresholds,
}

impl ProcedureService {
    pub fn new(pool: Arc<ConnectionPool>, allow_list: Arc<AllowList>) -> Self {
        Self {
            pool,
            allow_list,
            thresholds: HealthThresholds::default(),
        }
    }

    /// Use custom latency limits for `health`
    pub fn with_health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Check a procedure name and return its allow-listed spelling
    pub fn authorize(&self, procedure: &str) -> ServiceResult<String> {
        let name = procedure.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "procedure name required".to_string(),
            ));
        }

        match self.allow_list.resolve(name) {
            Some(canonical) => Ok(canonical.to_string()),
            None => {
                tracing::warn!(procedure = %name, "rejected procedure not in allow-list");
                Err(ServiceError::Validation(
                    "procedure not permitted".to_string(),
                ))
            }
        }
    }

    /// Invoke an allow-listed procedure with already-built parameters
    #[tracing::instrument(skip(self, parameters), fields(params = parameters.len()))]
    pub async fn invoke(
        &self,
        procedure: &str,
        parameters: ParamMap,
    ) -> ServiceResult<ProcedureResponse> {
        let name = self.authorize(procedure)?;
        self.execute(name, parameters).await
    }

    /// Invoke a procedure described by a JSON request.
    ///
    /// The name is checked before parameters are parsed, so a rejected
    /// procedure never has its parameters looked at.
    #[tracing::instrument(skip(self, request), fields(procedure = %request.procedure))]
    pub async fn invoke_json(&self, request: ProcedureRequest) -> ServiceResult<ProcedureResponse> {
        let name = self.authorize(&request.procedure)?;

        let parameters = match &request.parameters {
            Some(object) => ParamMap::from_json_object(object).map_err(|e| match e {
                ProcgateError::InvalidParameter(msg) => ServiceError::Validation(msg),
                other => ServiceError::Unexpected(other),
            })?,
            None => ParamMap::new(),
        };

        self.execute(name, parameters).await
    }

    async fn execute(&self, name: String, parameters: ParamMap) -> ServiceResult<ProcedureResponse> {
        let conn = self.pool.get().await.map_err(|e| {
            tracing::error!(procedure = %name, error = %e, "could not acquire a database connection");
            ServiceError::Unavailable(e)
        })?;

        tracing::debug!(procedure = %name, "dispatching procedure call");
        let start = Instant::now();

        match conn.call_procedure(&name, &parameters).await {
            Ok(results) => {
                tracing::debug!(
                    procedure = %name,
                    result_sets = results.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "procedure call finished"
                );
                let status = ProcedureStatus::from_results(&results);
                Ok(ProcedureResponse {
                    procedure: name,
                    results,
                    status,
                })
            }
            Err(e @ (ProcgateError::Cancelled | ProcgateError::Other(_))) => {
                tracing::error!(procedure = %name, error = ?e, "unexpected failure during procedure call");
                Err(ServiceError::Unexpected(e))
            }
            Err(e) => {
                tracing::error!(procedure = %name, error = ?e, "procedure call failed");
                Err(ServiceError::Database {
                    procedure: name,
                    source: e,
                })
            }
        }
    }

    /// Allow-listed procedure names, sorted
    pub fn allowed_procedures(&self) -> Vec<String> {
        self.allow_list.names()
    }

    /// Ping the database through the pool and classify the latency
    pub async fn health(&self) -> HealthReport {
        let outcome = match self.pool.get().await {
            Ok(conn) => ping_connection(&*conn).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let (status, latency_ms, error) = match outcome {
            Ok(latency) => (
                self.thresholds.classify(latency),
                Some(latency.as_millis() as u64),
                None,
            ),
            Err(message) => {
                tracing::warn!(error = %message, "database health check failed");
                (HealthStatus::Unhealthy, None, Some(message))
            }
        };

        HealthReport {
            status,
            latency_ms,
            pool: self.pool.stats(),
            error,
        }
    }

    /// The pool this service draws connections from
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}
