use serde::Serialize;
use stowage_core::{AppError, ErrorMetadata};
use stowage_services::{ImageInfo, ValidatedUpload};

/// Client-facing error body: never carries backend detail for sensitive errors.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorReport {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
    pub recoverable: bool,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        ErrorReport {
            status: err.http_status_code(),
            code: err.error_code(),
            message: err.client_message(),
            suggested_action: err.suggested_action(),
            recoverable: err.is_recoverable(),
        }
    }
}

/// Summary printed by the `validate` subcommand.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub category: String,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_format: Option<String>,
    pub digest: String,
}

impl From<&ValidatedUpload> for ValidationReport {
    fn from(v: &ValidatedUpload) -> Self {
        ValidationReport {
            category: v.category.to_string(),
            mime_type: v.mime_type,
            extension: v.extension,
            size_bytes: v.size,
            width: v.image.as_ref().map(|i| i.width),
            height: v.image.as_ref().map(|i| i.height),
            image_format: v.image.as_ref().map(|i| i.format.clone()),
            digest: v.digest_prefix.clone(),
        }
    }
}

/// Log an error at the level its metadata asks for.
pub fn log_app_error(err: &AppError) {
    match err.log_level() {
        stowage_core::LogLevel::Debug => tracing::debug!(error = %err, "Request rejected"),
        stowage_core::LogLevel::Warn => tracing::warn!(error = %err, "Request failed"),
        stowage_core::LogLevel::Error => tracing::error!(error = %err, "Request failed"),
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
