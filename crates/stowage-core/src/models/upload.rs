use serde::{Deserialize, Serialize};

/// Result of a successful upload.
///
/// `url` is the public base URL joined with the storage key. It is a return value
/// only; nothing about the upload is persisted outside the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "filename")]
    pub secure_filename: String,
    pub url: String,
}
