//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - One method per use case, parameters always bound
//! - Insert-if-absent via ON CONFLICT DO NOTHING
//! - Statements auto-commit individually; no multi-statement transactions

pub mod investors;
pub mod tables;
pub mod holdings;
pub mod insights;

pub use investors::{InvestorRepo, LocationChange, UpdateOutcome};
pub use tables::TableRepo;
pub use holdings::HoldingRepo;
pub use insights::InsightRepo;

use crate::models::ValidationError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{operation} affected no rows")]
    NoRowsAffected { operation: &'static str },

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Outcome of a read whose failure the caller may want to absorb.
///
/// Handlers choose per endpoint how `Empty` and `Failed` map to a response.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    Found(Vec<T>),
    Empty,
    Failed(DbError),
}

impl<T> From<Result<Vec<T>, DbError>> for ReadOutcome<T> {
    fn from(result: Result<Vec<T>, DbError>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => Self::Empty,
            Ok(rows) => Self::Found(rows),
            Err(e) => Self::Failed(e),
        }
    }
}
