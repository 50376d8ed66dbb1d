//! Unified error type for the booking core.
//!
//! Every workflow operation returns [`Result`]. Errors are surfaced to the
//! caller, never retried here; the boundary layer decides how to present them.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error type shared by every operation in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing configuration or seed data
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Any other driver error
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// A referenced row does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Malformed or incomplete input
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    /// The store refused a write over a unique or foreign key constraint
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// A row just written cannot be read back
    #[error("Inconsistent store state: {message}")]
    Inconsistent { message: String },

    /// The slot is held by another booking
    #[error("Schedule slot {slot_id} is already booked")]
    SlotUnavailable { slot_id: i64 },
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Maps a failed write, turning unique and foreign key violations into
    /// [`Error::ConstraintViolation`] and leaving everything else as a driver error.
    pub(crate) fn from_write(err: DbErr, context: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::ConstraintViolation {
                message: format!("{context}: duplicate key ({detail})"),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => Self::ConstraintViolation {
                message: format!("{context}: row is still referenced ({detail})"),
            },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
