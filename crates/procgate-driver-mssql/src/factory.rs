//! Pool factory that opens SQL Server connections

use std::sync::Arc;

use async_trait::async_trait;
use procgate_connection::ConnectionFactory;
use procgate_core::{ProcedureConnection, Result};

use crate::config::MssqlConfig;
use crate::connection::MssqlConnection;

/// Opens a fresh [`MssqlConnection`] each time the pool needs one
#[derive(Debug, Clone)]
pub struct MssqlConnectionFactory {
    config: MssqlConfig,
}

impl MssqlConnectionFactory {
    pub fn new(config: MssqlConfig) -> Self {
        Self { config }
    }

    /// Settings this factory connects with
    pub fn config(&self) -> &MssqlConfig {
        &self.config
    }
}

#[async_trait]
impl ConnectionFactory for MssqlConnectionFactory {
    async fn create(&self) -> Result<Arc<dyn ProcedureConnection>> {
        let conn = MssqlConnection::connect(&self.config).await?;
        Ok(Arc::new(conn))
    }
}
