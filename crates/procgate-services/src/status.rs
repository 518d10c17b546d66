//! Structured status reported by a procedure
//!
//! Procedures report their outcome through a `status` column (with an
//! optional `message` or `mensaje` column) in the first row of their last
//! result set. Other columns are never inspected.

use procgate_core::{ProcValue, ResultSets, Row};
use serde::Serialize;

/// Outcome a procedure reported about itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureStatus {
    pub status: StatusKind,
    pub message: Option<String>,
}

const MESSAGE_COLUMNS: [&str; 2] = ["message", "mensaje"];

impl ProcedureStatus {
    /// Read the status from the last result set, if it carries one
    pub fn from_results(results: &ResultSets) -> Option<Self> {
        let row = results.last()?.rows().first()?;
        Self::from_row(row)
    }

    /// Read the status from a single row.
    ///
    /// Returns `None` when there is no `status` column or its value is not
    /// recognised.
    pub fn from_row(row: &Row) -> Option<Self> {
        let status = parse_status(row.get("status")?)?;
        let message = MESSAGE_COLUMNS
            .iter()
            .find_map(|col| row.get(col))
            .filter(|value| !value.is_null())
            .map(|value| match value {
                ProcValue::Text(s) => s.clone(),
                other => other.to_string(),
            });

        Some(Self { status, message })
    }

    pub fn is_error(&self) -> bool {
        self.status == StatusKind::Error
    }
}

fn parse_status(value: &ProcValue) -> Option<StatusKind> {
    match value {
        ProcValue::Bool(true) => Some(StatusKind::Success),
        ProcValue::Bool(false) => Some(StatusKind::Error),
        ProcValue::Int(1) => Some(StatusKind::Success),
        ProcValue::Int(0) => Some(StatusKind::Error),
        ProcValue::Text(text) => match text.trim().to_lowercase().as_str() {
            "success" | "ok" | "exito" | "éxito" | "1" => Some(StatusKind::Success),
            "error" | "fail" | "failed" | "failure" | "0" => Some(StatusKind::Error),
            _ => None,
        },
        _ => None,
    }
}
