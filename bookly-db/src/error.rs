//! Error types for bookly-db
//!
//! Engine errors are carried through unmodified. Callers that need to react to
//! a specific failure (duplicate key, dangling foreign key) use the
//! classification helpers instead of matching on driver internals.

use sqlx::error::DatabaseError;
use thiserror::Error;

/// Result type alias for bookly-db operations
pub type Result<T> = std::result::Result<T, DbError>;

/// Main error type for persistence operations
#[derive(Error, Debug)]
pub enum DbError {
    /// Opening a connection (or acquiring one from the pool) failed
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// A schema statement failed during storage initialization
    #[error("schema initialization failed at '{statement}': {source}")]
    Schema {
        statement: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Any other engine error, including constraint violations
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Lookup by primary key found nothing
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Configuration could not be resolved
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl DbError {
    /// Create a not-found error for a resource id
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// True for a duplicate key on a unique or primary key constraint.
    pub fn is_unique_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_unique_violation())
    }

    /// True when a referenced row does not exist (or is still referenced on delete).
    pub fn is_foreign_key_violation(&self) -> bool {
        self.database_error()
            .is_some_and(|e| e.is_foreign_key_violation())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn database_error(&self) -> Option<&dyn DatabaseError> {
        match self {
            Self::Sqlx(sqlx::Error::Database(e))
            | Self::Schema {
                source: sqlx::Error::Database(e),
                ..
            } => Some(e.as_ref()),
            _ => None,
        }
    }
}
