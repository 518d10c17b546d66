//! Connection trait for stored-procedure execution

use crate::{ParamMap, Result, ResultSets};
use async_trait::async_trait;

/// A database connection able to execute stored procedures
#[async_trait]
pub trait ProcedureConnection: Send + Sync {
    /// Get the driver name (e.g., "mssql")
    fn driver_name(&self) -> &str;

    /// Execute a stored procedure and collect every result set it produces.
    ///
    /// `procedure` has already been checked by the caller; drivers only quote
    /// it. Parameters are bound by name and never interpolated into the
    /// statement text. Result sets and rows come back in the order the
    /// database produced them. On error, nothing collected so far is returned.
    async fn call_procedure(&self, procedure: &str, params: &ParamMap) -> Result<ResultSets>;

    /// Run a minimal round trip to check the connection is alive
    async fn ping(&self) -> Result<()>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
