//! Error types for command storage.

use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The requested command was not found in the store.
    #[error("command not found in store")]
    NotFound,
    /// A command with the same identifier already exists.
    #[error("command already exists in store")]
    AlreadyExists,
    /// A stored value could not be converted to or from its Rust form.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// An internal storage system error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::AlreadyExists
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                RepositoryError::Serialization(e.to_string())
            }
            _ => RepositoryError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert_eq!(err, RepositoryError::NotFound);
    }

    #[test]
    fn pool_errors_map_to_internal() {
        let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RepositoryError::Internal(_)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            RepositoryError::NotFound.to_string(),
            "command not found in store"
        );
        assert_eq!(
            RepositoryError::Internal("boom".to_string()).to_string(),
            "internal error: boom"
        );
    }
}
