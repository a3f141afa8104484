//! Stowage Storage Library
//!
//! This crate provides the blob store abstraction and its implementations (S3 and an
//! in-process memory store), storage key derivation, and bucket lifecycle management.
//!
//! # Storage key format
//!
//! Every object lives under `{user_id}/{category_segment}/{secure_filename}` where the
//! category segment is one of `pictures`, `previews` or `resumes`. Key generation is
//! centralized in the `keys` module; backends never build keys themselves.

pub mod bucket;
pub mod bucket_policy;
pub mod factory;
pub mod keys;
pub mod listing;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use bucket::{BucketManager, BucketStatus};
pub use factory::create_blob_store;
pub use keys::StorageKey;
pub use listing::list_pages;
#[cfg(feature = "storage-memory")]
pub use memory::{MemoryBlobStore, MemoryOperation, StoredObject};
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use stowage_core::StorageBackend;
pub use traits::{BlobStore, ObjectPage, StorageError, StorageResult, MAX_KEYS_PER_REQUEST};
