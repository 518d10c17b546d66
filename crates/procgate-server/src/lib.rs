//! procgate server - HTTP front end for the procedure invocation service

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;


use std::sync::Arc;

use procgate_connection::ConnectionPool;
use procgate_driver_mssql::MssqlConnectionFactory;
use procgate_services::{AllowList, ProcedureService};

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use routes::{AppState, router};

/// Wire the SQL Server pool and allow-list into a service
pub fn build_service(config: &AppConfig) -> Result<ProcedureService, ConfigError> {
    let allow_list = AllowList::new(&config.procedures.allowed)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    if allow_list.is_empty() {
        tracing::warn!("procedure allow-list is empty; every invocation will be rejected");
    }

    let factory = MssqlConnectionFactory::new(config.database.clone());
    let pool = ConnectionPool::new(config.pool.clone(), factory);

    Ok(ProcedureService::new(Arc::new(pool), Arc::new(allow_list))
        .with_health_thresholds(config.health))
}
