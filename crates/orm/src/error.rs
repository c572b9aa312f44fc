//! Error types for the ORM system
//!
//! Integrity faults, paging misuse and parameter-bound violations are kept
//! as distinct variants so callers can tell a bad request from bad data.

use thiserror::Error;

use crate::schema::OrderError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Database query or driver error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection pool error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query building error
    #[error("Query error: {0}")]
    Query(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A referenced row is missing. Consistent data never produces this.
    #[error("Integrity fault: {entity} with id {id} not found")]
    NotFound { entity: String, id: i64 },

    /// Paging was supplied to a strategy whose root rows are multiplied by a join
    #[error("Invalid paging: {0}")]
    InvalidPaging(String),

    /// Too many bind parameters for a single statement
    #[error("Parameter limit exceeded: {count} parameters, backend allows {limit}")]
    ParameterLimitExceeded { count: usize, limit: usize },

    /// More than one one-to-many association fetch-joined into a single query
    #[error("Collection fetch limit: {0}")]
    CollectionFetchLimit(String),

    /// An association placeholder was read before being initialised
    #[error("Association not loaded: {0}")]
    NotLoaded(String),

    /// Domain rule violation
    #[error(transparent)]
    Domain(#[from] OrderError),
}

impl ModelError {
    /// Build an integrity fault for a missing entity
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        ModelError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// True for errors that indicate inconsistent stored data
    pub fn is_integrity_fault(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_integrity_fault() {
        let err = ModelError::not_found("member", 7);
        assert!(err.is_integrity_fault());
        assert_eq!(err.to_string(), "Integrity fault: member with id 7 not found");
        assert!(!ModelError::InvalidPaging("x".into()).is_integrity_fault());
    }

    #[test]
    fn test_parameter_limit_message() {
        let err = ModelError::ParameterLimitExceeded { count: 70000, limit: 65535 };
        assert!(err.to_string().contains("70000"));
        assert!(err.to_string().contains("65535"));
    }

    #[test]
    fn test_domain_error_converts() {
        let err: ModelError = OrderError::AlreadyCanceled.into();
        assert!(matches!(err, ModelError::Domain(OrderError::AlreadyCanceled)));
    }
}
