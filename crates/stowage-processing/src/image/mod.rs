//! Image processing module
//!
//! Structural checks for uploaded images: the buffer must decode completely.

pub mod processor;

pub use processor::{ImageInfo, ImageProcessor};
