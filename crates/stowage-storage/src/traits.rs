//! Blob store abstraction trait
//!
//! This module defines the BlobStore trait that every backend implements. The trait
//! mirrors the subset of the S3 protocol the gateway needs: bucket probing and
//! provisioning, policy management, object writes, paginated listing and removal.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

/// Largest page the S3 protocol returns from a single listing call, and the largest
/// key set accepted by a single bulk delete.
pub const MAX_KEYS_PER_REQUEST: usize = 1000;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Bucket creation failed: {0}")]
    BucketCreation(String),

    #[error("Bucket policy failed: {0}")]
    BucketPolicy(String),

    #[error("Bucket unavailable: {0}")]
    BucketUnavailable(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Token for the next page; `None` when the listing is complete
    pub next_continuation_token: Option<String>,
}

/// Blob store abstraction trait
///
/// A handle is built once at startup and shared read-only (`Arc<dyn BlobStore>`);
/// implementations must be safe for unlimited concurrent use. Keys are
/// `{user_id}/{category}/{filename}`, see the `keys` module.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Name of the bucket this handle operates on
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Whether the bucket exists
    async fn bucket_exists(&self) -> StorageResult<bool>;

    /// Create the bucket
    async fn create_bucket(&self) -> StorageResult<()>;

    /// Read the bucket policy document, `None` when no policy is attached
    async fn get_bucket_policy(&self) -> StorageResult<Option<String>>;

    /// Replace the bucket policy document
    async fn set_bucket_policy(&self, policy: &str) -> StorageResult<()>;

    /// Write an object, replacing any object stored under the same key
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<()>;

    /// List one page of keys under `prefix` (recursive, no delimiter)
    ///
    /// `continuation_token` is the token returned by the previous page. At most
    /// `max_keys` keys are returned.
    async fn list_objects_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
        max_keys: usize,
    ) -> StorageResult<ObjectPage>;

    /// Remove a single object. Removing an absent key succeeds.
    async fn delete_object(&self, key: &str) -> StorageResult<()>;

    /// Remove a set of objects in bulk
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()>;
}
