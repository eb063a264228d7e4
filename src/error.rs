//! Error types for depot.

use thiserror::Error;

/// Common error type for depot operations.
#[derive(Error, Debug)]
pub enum DepotError {
    /// Missing, unknown, or expired session token.
    #[error("unauthorized")]
    Unauthorized,

    /// Invalid request input (missing name, bad type, missing data, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested parent record does not exist.
    #[error("parent not found")]
    ParentNotFound,

    /// The requested parent record exists but is not a folder.
    #[error("parent is not a folder")]
    ParentNotFolder,

    /// Resource absent or not owned by the caller.
    ///
    /// The two cases are deliberately indistinguishable so that the
    /// existence of other users' files never leaks.
    #[error("{0} not found")]
    NotFound(String),

    /// Database error.
    ///
    /// Wraps errors from sqlx; surfaced to clients as a generic server
    /// fault.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error from the blob store or the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DepotError {
    fn from(e: sqlx::Error) -> Self {
        DepotError::Database(e.to_string())
    }
}

/// Result type alias for depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        assert_eq!(DepotError::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_validation_display() {
        let err = DepotError::Validation("Missing name".to_string());
        assert_eq!(err.to_string(), "validation error: Missing name");
    }

    #[test]
    fn test_parent_errors_display() {
        assert_eq!(DepotError::ParentNotFound.to_string(), "parent not found");
        assert_eq!(
            DepotError::ParentNotFolder.to_string(),
            "parent is not a folder"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = DepotError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DepotError = io_err.into();
        assert!(matches!(err, DepotError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_result_alias() {
        fn sample() -> Result<i32> {
            Ok(7)
        }
        assert_eq!(sample().unwrap(), 7);
    }
}
