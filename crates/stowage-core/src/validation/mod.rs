//! Upload validation errors
//!
//! Every variant is caused by the uploaded content, carries the offending value,
//! and is safe to show to the client.

/// Validation failures, reported first-failure-wins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File size of {size} bytes exceeds maximum allowed size of {}MB", max / (1024 * 1024))]
    SizeExceeded { size: usize, max: usize },

    #[error("File type .{extension} is blocked for security reasons")]
    ExtensionBlocked { extension: String },

    #[error("File extension .{extension} is not allowed for {category}. Allowed extensions: {}", allowed.join(", "))]
    ExtensionNotAllowed {
        extension: String,
        category: String,
        allowed: Vec<String>,
    },

    #[error("Could not determine file type from content")]
    ContentUndetected,

    #[error("File content type {detected} does not match allowed types for {category}: {}", allowed.join(", "))]
    ContentTypeMismatch {
        detected: String,
        category: String,
        allowed: Vec<String>,
    },

    #[error("Invalid image file: {0}")]
    ImageCorrupt(String),
}

impl ValidationError {
    /// Machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::SizeExceeded { .. } => "SIZE_EXCEEDED",
            ValidationError::ExtensionBlocked { .. } => "EXTENSION_BLOCKED",
            ValidationError::ExtensionNotAllowed { .. } => "EXTENSION_NOT_ALLOWED",
            ValidationError::ContentUndetected => "CONTENT_UNDETECTED",
            ValidationError::ContentTypeMismatch { .. } => "CONTENT_TYPE_MISMATCH",
            ValidationError::ImageCorrupt(_) => "IMAGE_CORRUPT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_message_names_limit() {
        let err = ValidationError::SizeExceeded {
            size: 5 * 1024 * 1024 + 1,
            max: 5 * 1024 * 1024,
        };
        assert!(err.to_string().contains("5MB"));
        assert!(err.to_string().contains("5242881"));
    }

    #[test]
    fn test_not_allowed_message_lists_allowed_set() {
        let err = ValidationError::ExtensionNotAllowed {
            extension: "gif".to_string(),
            category: "document".to_string(),
            allowed: vec!["pdf".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "File extension .gif is not allowed for document. Allowed extensions: pdf"
        );
        assert_eq!(err.code(), "EXTENSION_NOT_ALLOWED");
    }
}
