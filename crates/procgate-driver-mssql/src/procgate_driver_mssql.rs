//! MS SQL Server driver for procgate
//!
//! This crate executes allow-listed stored procedures on SQL Server through
//! tiberius, binding parameters by name and streaming every result set back.

mod config;
mod connection;
mod dialect;
mod factory;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod dialect_tests;

pub use config::MssqlConfig;
pub use connection::{MssqlConnection, MssqlConnectionError};
pub use dialect::{MssqlDialect, build_exec_statement};
pub use factory::MssqlConnectionFactory;
