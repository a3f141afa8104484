//! Upload policy table
//!
//! Per-category size limits and allow-lists, plus the global extension deny-list.
//! Adding a category means adding a row here, not another branch in the validator.

use crate::models::UploadCategory;

const MIB: usize = 1024 * 1024;

/// Extensions rejected for every category (executables, scripts, system files,
/// archives that can carry executables). Stored without the leading dot.
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    // Executables
    "exe", "dll", "bat", "cmd", "sh", "msi", "com", "app",
    // Scripts
    "js", "php", "asp", "aspx", "jsp", "cgi", "py", "pl", "rb",
    // System files
    "sys", "drv", "bin", "vbs", "ps1", "scr",
    // Archives that may contain executables
    "jar", "war",
    // Other
    "reg", "inf",
];

/// Immutable validation rule for one upload category.
#[derive(Debug, PartialEq, Eq)]
pub struct PolicyRule {
    pub max_bytes: usize,
    pub allowed_extensions: &'static [&'static str],
    pub allowed_mime_types: &'static [&'static str],
    /// Largest decoded image accepted, in pixels. Zero for categories without images.
    pub max_image_pixels: u64,
}

static PICTURE_POLICY: PolicyRule = PolicyRule {
    max_bytes: 5 * MIB,
    allowed_extensions: &["jpg", "jpeg", "png", "gif"],
    allowed_mime_types: &["image/jpeg", "image/png", "image/gif"],
    max_image_pixels: 4096 * 4096,
};

static PREVIEW_POLICY: PolicyRule = PolicyRule {
    max_bytes: 2 * MIB,
    allowed_extensions: &["jpg", "jpeg", "png", "pdf"],
    allowed_mime_types: &["image/jpeg", "image/png", "application/pdf"],
    max_image_pixels: 2048 * 2048,
};

static DOCUMENT_POLICY: PolicyRule = PolicyRule {
    max_bytes: 10 * MIB,
    allowed_extensions: &["pdf"],
    allowed_mime_types: &["application/pdf"],
    max_image_pixels: 0,
};

impl PolicyRule {
    pub fn for_category(category: UploadCategory) -> &'static PolicyRule {
        match category {
            UploadCategory::Picture => &PICTURE_POLICY,
            UploadCategory::Preview => &PREVIEW_POLICY,
            UploadCategory::Document => &DOCUMENT_POLICY,
        }
    }

    /// `extension` must already be lower-cased and dot-free.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(&extension)
    }

    pub fn allows_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.contains(&mime_type)
    }
}

/// `extension` must already be lower-cased and dot-free.
pub fn is_blocked_extension(extension: &str) -> bool {
    BLOCKED_EXTENSIONS.contains(&extension)
}
