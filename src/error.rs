//! Error types for Filevault.

use thiserror::Error;

/// Common error type for Filevault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the storage
    /// backend. Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No authenticated session for an operation that requires one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The caller's account does not own the target file.
    #[error("caller is not the owner of the file")]
    NotOwner,

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for user input or malformed stored records.
    #[error("validation error: {0}")]
    Validation(String),

    /// One-time code email could not be delivered.
    #[error("failed to deliver one-time code: {0}")]
    Delivery(String),

    /// One-time code could not be issued during account creation.
    #[error("failed to issue one-time code: {0}")]
    OtpIssuance(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

/// Result type alias for Filevault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_display() {
        assert_eq!(
            VaultError::NotAuthenticated.to_string(),
            "not authenticated"
        );
    }

    #[test]
    fn test_not_owner_display() {
        assert_eq!(
            VaultError::NotOwner.to_string(),
            "caller is not the owner of the file"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = VaultError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_delivery_error_display() {
        let err = VaultError::Delivery("outbox unavailable".to_string());
        assert_eq!(
            err.to_string(),
            "failed to deliver one-time code: outbox unavailable"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "blob missing");
        let err: VaultError = io_err.into();
        assert!(matches!(err, VaultError::Io(_)));
        assert!(err.to_string().contains("blob missing"));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(VaultError::NotAuthenticated)
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
