//! Domain errors for the employee tracker.

use thiserror::Error;

/// Domain-level errors that can occur while managing the organization.
///
/// Not-found is not an error: lookups return `Option` and id-keyed
/// deletes of an unknown id are no-ops.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database has already been started")]
    AlreadyStarted,

    #[error("Database connection is not open")]
    NotConnected,

    #[error("{entity} already persisted with id {id}")]
    AlreadyPersisted { entity: &'static str, id: i64 },

    #[error("Employee {0} cannot be their own manager")]
    SelfManagement(i64),

    #[error("Missing column in result row: {0}")]
    MissingColumn(String),

    #[error("Invalid value in column {column}: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}
