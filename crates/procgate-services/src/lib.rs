//! procgate services - the procedure invocation adapter
//!
//! `ProcedureService` checks procedure names against an injected allow-list,
//! coerces loosely-typed parameters, runs the call on a pooled connection and
//! returns every result set in order.

mod allowlist;
mod error;
mod procedure_service;
mod status;


pub use allowlist::AllowList;
pub use error::{ServiceError, ServiceResult};
pub use procedure_service::{HealthReport, ProcedureRequest, ProcedureResponse, ProcedureService};
pub use status::{ProcedureStatus, StatusKind};
