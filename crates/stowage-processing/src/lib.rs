//! Stowage Processing Library
//!
//! Upload validation: size limits, extension deny/allow lists, magic-number content
//! detection, structural image checks and the audit digest.

pub mod content;
pub mod image;
pub mod validator;

pub use content::{sniff, DetectedContent};
pub use image::{ImageInfo, ImageProcessor};
pub use validator::{digest_prefix, UploadValidator, ValidatedUpload};
