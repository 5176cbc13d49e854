//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity_type} with id {id} not found")]
    NotFound { entity_type: &'static str, id: i64 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Only the owner may modify this {entity_type}")]
    Forbidden { entity_type: &'static str },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: i64) -> Self {
        Self::NotFound { entity_type, id }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
