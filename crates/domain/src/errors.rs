//! Domain error types.
//!
//! Every storage port returns [`StoreError`] so callers can tell a missing
//! row from a lost race from an unreachable database. Workflow operations
//! return [`WorkflowError`].

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::RequestStatus;

/// Failure reported by a storage port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("value rejected by the store: {0}")]
    Invalid(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Classifies a database error by its SQLSTATE code.
    pub fn from_sql_state(code: Option<&str>, message: String) -> Self {
        match code {
            Some("23505") => StoreError::Conflict("record already exists".to_string()),
            Some("23503") => StoreError::NotFound,
            // check_violation, numeric_value_out_of_range
            Some("23514") | Some("22003") => StoreError::Invalid(message),
            _ => StoreError::Unavailable(message),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                StoreError::from_sql_state(db_err.code().as_deref(), db_err.to_string())
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Failure of a workflow operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("request not found")]
    NotFound,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("cannot {action} a request in status {from}")]
    InvalidTransition {
        from: RequestStatus,
        action: &'static str,
    },

    #[error("request was modified concurrently, reload and retry")]
    Conflict,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient budget: {available} available, {required} required")]
    InsufficientBudget { available: Decimal, required: Decimal },

    #[error("budget is busy, retries exhausted")]
    BudgetContention,

    #[error(transparent)]
    Store(#[from] StoreError),
}
