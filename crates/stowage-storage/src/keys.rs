//! Storage key derivation.
//!
//! Key format: `{user_id}/{category_segment}/{secure_filename}`. The user id is opaque
//! and comes from the authenticated caller; it must be a single path segment. The
//! filename is restricted to `[A-Za-z0-9._-]`, so no derived key can contain a path
//! separator the caller chose.

use std::fmt;
use std::path::Path;

use stowage_core::UploadCategory;
use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

/// Longest secure filename, extension included.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// A derived, namespaced storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    key: String,
    secure_filename: String,
}

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.key
    }

    pub fn secure_filename(&self) -> &str {
        &self.secure_filename
    }

    /// Public URL of the object under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Collision-resistant identifier used when the caller supplies no filename.
pub fn generate_file_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Lower-cased extension of a declared filename, without the dot.
pub fn declared_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Base name of a declared filename: last path component with its extension dropped.
fn declared_stem(filename: &str) -> &str {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match last.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => last,
    }
}

/// Reject user ids that are not a single, non-empty path segment.
pub fn validate_user_id(user_id: &str) -> StorageResult<()> {
    if user_id.is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(['/', '\\'])
        || user_id.chars().any(char::is_control)
    {
        return Err(StorageError::InvalidKey(format!(
            "user id must be a single path segment: {:?}",
            user_id
        )));
    }
    Ok(())
}

/// Build `{base}.{extension}` and sanitize it, keeping the extension when truncating.
fn secure_filename(base: &str, extension: &str) -> String {
    let extension = sanitize_filename(extension);
    let budget = MAX_FILENAME_LENGTH.saturating_sub(extension.len() + 1);
    let base: String = sanitize_filename(base).chars().take(budget).collect();
    format!("{}.{}", base, extension)
}

/// Derive the key for a validated upload.
///
/// `extension` must be the one implied by the sniffed content type, never the declared
/// one. With no declared filename (or one that sanitizes to nothing) the base name is
/// produced by `generate_id`. The same inputs and generated id always give the same key.
pub fn derive_storage_key<F>(
    user_id: &str,
    category: UploadCategory,
    extension: &str,
    declared_filename: Option<&str>,
    generate_id: F,
) -> StorageResult<StorageKey>
where
    F: FnOnce() -> String,
{
    let prefix = category_prefix(user_id, category)?;

    let base = match declared_filename.map(declared_stem).map(str::trim) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => generate_id(),
    };

    let secure_filename = secure_filename(&base, extension);
    Ok(StorageKey {
        key: format!("{}{}", prefix, secure_filename),
        secure_filename,
    })
}

/// Key of an existing object addressed by the name a caller recorded.
///
/// A name that already carries an extension (such as the `secure_filename` returned by
/// an upload) is used as stored. A bare name falls back to the category convention
/// (`pdf` for documents, `jpg` for images).
pub fn object_key(
    user_id: &str,
    category: UploadCategory,
    filename: &str,
) -> StorageResult<String> {
    let prefix = category_prefix(user_id, category)?;

    let name = sanitize_filename(filename.trim());
    if name.is_empty() {
        return Err(StorageError::InvalidKey("filename must not be empty".to_string()));
    }

    let has_extension = declared_extension(&name)
        .is_some_and(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    let name = if has_extension {
        name
    } else {
        format!("{}.{}", name, category.default_extension())
    };

    Ok(format!("{}{}", prefix, name))
}

/// Prefix holding every object of one user.
pub fn user_prefix(user_id: &str) -> StorageResult<String> {
    validate_user_id(user_id)?;
    Ok(format!("{}/", user_id))
}

/// Prefix holding one user's objects of a single category.
pub fn category_prefix(user_id: &str, category: UploadCategory) -> StorageResult<String> {
    validate_user_id(user_id)?;
    Ok(format!("{}/{}/", user_id, category.path_segment()))
}
