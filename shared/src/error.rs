//! Record store error taxonomy

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors raised by the price bar store and the CSV importer.
///
/// An empty query result is never an error; callers get an empty `Vec`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Bulk import failed (header mismatch, bad row, unreadable source, ...)
    #[error("Import failed: {0}")]
    Import(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Map a unique-key violation reported by the database to `Conflict`.
    pub(crate) fn from_write(err: DbErr, conflict_msg: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(conflict_msg.to_string()),
            _ => StoreError::Database(err),
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Import(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Import(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
