//! Stowage Core Library
//!
//! This crate provides the upload categories, the static policy table, error types,
//! and configuration shared by every Stowage component.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{UploadCategory, UploadResult};
pub use policy::{is_blocked_extension, PolicyRule, BLOCKED_EXTENSIONS};
pub use storage_types::StorageBackend;
pub use validation::ValidationError;
// Note: BlobStore, StorageError, StorageResult live in the stowage-storage crate
