//! procgate core - value model and connection contract for stored-procedure calls
//!
//! This crate provides the types every other procgate crate depends on:
//!
//! - `ProcValue` - Tagged value bound as a parameter or decoded from a column
//! - `ParamMap` - Ordered, `@`-normalized procedure parameters
//! - `Row`, `ResultSet`, `ResultSets` - Ordered result sets with case-insensitive rows
//! - `ProcedureConnection` - Trait implemented by database drivers
//! - `ProcgateError` - Core error type

mod connection;
mod error;
mod params;
mod result;
mod value;

#[cfg(test)]
mod result_tests;
#[cfg(test)]
mod value_tests;

pub use connection::*;
pub use error::*;
pub use params::*;
pub use result::*;
pub use value::*;
