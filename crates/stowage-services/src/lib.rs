//! Stowage Services Layer
//!
//! This crate is the **service layer**: it wires validation, key derivation and the
//! blob store into the object operations callers use, and re-exports a unified API
//! from processing and storage so that binaries depend on a single facade.

pub mod objects;

pub use objects::{
    app_error, ObjectService, META_ORIGINAL_FILENAME, META_UPLOAD_DATE, META_USER_ID,
};
pub use stowage_core::{AppError, Config, ErrorMetadata, UploadCategory, UploadResult};
pub use stowage_processing::{ImageInfo, UploadValidator, ValidatedUpload};
#[cfg(feature = "storage-memory")]
pub use stowage_storage::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
pub use stowage_storage::S3BlobStore;
pub use stowage_storage::{
    create_blob_store, BlobStore, BucketManager, BucketStatus, StorageBackend, StorageError,
    StorageResult,
};
