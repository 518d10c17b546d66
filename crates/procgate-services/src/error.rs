use procgate_core::ProcgateError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors.
///
/// Display strings are safe to show to callers; database detail stays in the
/// attached source.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected input such as a missing or non-allow-listed procedure name
    #[error("{0}")]
    Validation(String),

    /// The procedure call failed inside the database or driver
    #[error("operation failed")]
    Database {
        procedure: String,
        #[source]
        source: ProcgateError,
    },

    /// No pooled connection could be obtained
    #[error("database unavailable")]
    Unavailable(#[source] ProcgateError),

    /// Anything the service did not anticipate
    #[error(transparent)]
    Unexpected(ProcgateError),
}

impl ServiceError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::Database { .. } => "OPERATION_FAILED",
            ServiceError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            ServiceError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }
}
