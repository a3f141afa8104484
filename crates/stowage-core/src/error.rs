//! Error types module
//!
//! All errors that leave the storage core are unified under `AppError`. Validation
//! failures are client-caused and described precisely; infrastructure failures are
//! logged in full where they happen and reach the client as opaque messages so that
//! blob-store topology and error text never leak.

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPLOAD_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Failed to upload file: {0}")]
    UploadFailed(String),

    #[error("There was an error while deleting the object at the specified path: {path}")]
    DeleteFailed { path: String },

    #[error("There was an error while creating the storage bucket: {0}")]
    BucketCreation(String),

    #[error("There was an error while applying the policy to the storage bucket: {0}")]
    BucketPolicy(String),

    #[error("There was an error while checking if the storage bucket exists: {0}")]
    BucketUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Static metadata for each variant:
/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Validation(ValidationError::SizeExceeded { .. }) => (
            413,
            "SIZE_EXCEEDED",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Validation(inner) => (
            415,
            inner.code(),
            false,
            Some("Upload a file of an allowed type"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidKey(_) => (
            400,
            "INVALID_KEY",
            false,
            Some("Check user and file identifiers"),
            false,
            LogLevel::Debug,
        ),
        AppError::UploadFailed(_) => (
            500,
            "UPLOAD_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::DeleteFailed { .. } => (
            500,
            "DELETE_FAILED",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
        AppError::BucketCreation(_) => (
            500,
            "BUCKET_CREATION_FAILED",
            false,
            Some("Check storage credentials and endpoint"),
            true,
            LogLevel::Error,
        ),
        AppError::BucketPolicy(_) => (
            500,
            "BUCKET_POLICY_FAILED",
            false,
            Some("Check storage credentials and bucket permissions"),
            true,
            LogLevel::Error,
        ),
        AppError::BucketUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            None,
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Whether the caller caused this error by supplying bad input.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(inner) => inner.to_string(),
            AppError::InvalidKey(ref msg) => msg.clone(),
            AppError::UploadFailed(_) => "Failed to upload file".to_string(),
            AppError::DeleteFailed { path } => format!(
                "There was an error while deleting the object at the specified path: {}",
                path
            ),
            AppError::BucketCreation(_) => {
                "There was an error while creating the storage bucket".to_string()
            }
            AppError::BucketPolicy(_) => {
                "There was an error while applying the policy to the storage bucket".to_string()
            }
            AppError::BucketUnavailable(_) => "Storage is currently unavailable".to_string(),
            AppError::Configuration(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
