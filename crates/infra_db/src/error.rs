//! Errors raised inside the PostgreSQL adapters
//!
//! Nothing outside this crate sees a `DatabaseError`; the adapters convert
//! it to `PortError` at the trait boundary.

use thiserror::Error;

use core_kernel::PortError;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Cannot reach PostgreSQL: {0}")]
    ConnectionFailed(String),

    /// No free connection within the acquire timeout
    #[error("Timed out waiting for a pooled connection")]
    PoolExhausted,

    #[error("Row not found: {0}")]
    NotFound(String),

    /// Unique, foreign key or check constraint fired (SQLSTATE class 23)
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Serialization failure or deadlock; the transaction was rolled back
    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Stored row is unreadable: {0}")]
    SerializationError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sql(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound("query returned no rows".to_string()),
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::Io(e) => Self::ConnectionFailed(e.to_string()),
            sqlx::Error::Decode(e) => Self::SerializationError(e.to_string()),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::SerializationError(format!("column {}: {}", index, source))
            }
            sqlx::Error::Database(db) => {
                let message = db.message().to_string();
                let code = db.code().map(|c| c.into_owned());
                match code.as_deref() {
                    Some(code) if code.starts_with("23") => Self::IntegrityViolation(message),
                    Some("40001" | "40P01") => Self::TransactionAborted(message),
                    Some(code) if code.starts_with("08") => Self::ConnectionFailed(message),
                    _ => Self::Sql(sqlx::Error::Database(db)),
                }
            }
            other => Self::Sql(other),
        }
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(detail) => PortError::not_found("Row", detail),
            DatabaseError::IntegrityViolation(message) => PortError::Conflict { message },
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "PostgreSQL connection pool".to_string(),
            },
            DatabaseError::TransactionAborted(message) => PortError::ServiceUnavailable {
                service: format!("PostgreSQL transaction ({})", message),
            },
            DatabaseError::SerializationError(message) => PortError::Transformation { message },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_violation_becomes_conflict() {
        let port: PortError =
            DatabaseError::IntegrityViolation("one approved claim per target".into()).into();
        assert!(matches!(port, PortError::Conflict { .. }));
    }

    #[test]
    fn test_pool_exhaustion_is_transient() {
        assert!(PortError::from(DatabaseError::PoolExhausted).is_transient());
        assert!(PortError::from(DatabaseError::TransactionAborted("deadlock".into())).is_transient());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, DatabaseError::NotFound(_)));
        assert!(PortError::from(error).is_not_found());
    }

    #[test]
    fn test_unreadable_row_is_not_transient() {
        let port = PortError::from(DatabaseError::SerializationError("bad status".into()));
        assert!(matches!(port, PortError::Transformation { .. }));
        assert!(!port.is_transient());
    }
}
