use crate::content::sniff;
use crate::image::{ImageInfo, ImageProcessor};
use sha2::{Digest, Sha256};
use std::path::Path;
use stowage_core::{is_blocked_extension, UploadCategory, ValidationError};

/// Number of hex characters of the SHA-256 digest kept for audit logs.
const DIGEST_PREFIX_LEN: usize = 8;

/// An upload that passed every validation stage.
///
/// Carries what later stages need so the content is never sniffed twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub category: UploadCategory,
    /// MIME type detected from the content
    pub mime_type: &'static str,
    /// Extension implied by `mime_type`, without the dot
    pub extension: &'static str,
    pub size: usize,
    /// Format and dimensions, for decoded images
    pub image: Option<ImageInfo>,
    /// First hex characters of the SHA-256 digest
    pub digest_prefix: String,
}

/// Upload validator
///
/// Runs the ordered stages size, extension, content sniffing, image structure and
/// audit hash. The first failing stage wins. Validation touches no persisted state;
/// its only side effect is the audit log line written on success.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadValidator;

impl UploadValidator {
    pub fn new() -> Self {
        UploadValidator
    }

    /// Validate `data` against the policy of `category`.
    ///
    /// `declared_filename` is only used for the extension stage and the audit log; when
    /// absent there is no declared extension to check. CPU-bound (image decode).
    pub fn validate(
        &self,
        data: &[u8],
        category: UploadCategory,
        declared_filename: Option<&str>,
    ) -> Result<ValidatedUpload, ValidationError> {
        self.validate_size(data.len(), category)?;

        if let Some(filename) = declared_filename {
            self.validate_extension(filename, category)?;
        }

        let detected = sniff(data).ok_or(ValidationError::ContentUndetected)?;
        let rule = category.policy();
        if !rule.allows_mime_type(detected.mime_type) {
            return Err(ValidationError::ContentTypeMismatch {
                detected: detected.mime_type.to_string(),
                category: category.to_string(),
                allowed: to_strings(rule.allowed_mime_types),
            });
        }

        let image = if category.is_image() && detected.is_image() {
            let info = ImageProcessor::validate_and_get_info(data, rule.max_image_pixels)
                .map_err(|e| ValidationError::ImageCorrupt(e.to_string()))?;
            Some(info)
        } else {
            None
        };

        let digest_prefix = digest_prefix(data);

        tracing::info!(
            digest = %digest_prefix,
            mime_type = detected.mime_type,
            size_bytes = data.len(),
            category = %category,
            image_format = image.as_ref().map(|i| i.format.as_str()),
            filename = declared_filename.unwrap_or("<generated>"),
            "Upload validated"
        );

        Ok(ValidatedUpload {
            category,
            mime_type: detected.mime_type,
            extension: detected.extension,
            size: data.len(),
            image,
            digest_prefix,
        })
    }

    /// Validate file size. Exactly the limit passes.
    pub fn validate_size(
        &self,
        size: usize,
        category: UploadCategory,
    ) -> Result<(), ValidationError> {
        let max = category.policy().max_bytes;
        if size > max {
            return Err(ValidationError::SizeExceeded { size, max });
        }
        Ok(())
    }

    /// Validate the declared extension: deny-list first, then the category allow-list.
    pub fn validate_extension(
        &self,
        filename: &str,
        category: UploadCategory,
    ) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if is_blocked_extension(&extension) {
            return Err(ValidationError::ExtensionBlocked { extension });
        }

        let rule = category.policy();
        if !rule.allows_extension(&extension) {
            return Err(ValidationError::ExtensionNotAllowed {
                extension,
                category: category.to_string(),
                allowed: to_strings(rule.allowed_extensions),
            });
        }

        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Leading hex characters of the SHA-256 digest of `data`.
pub fn digest_prefix(data: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(data));
    digest[..DIGEST_PREFIX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::processor::tests::png_declaring;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n";

    fn jpeg() -> Vec<u8> {
        let img = RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 77]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn png() -> Vec<u8> {
        let img = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, (x ^ y) as u8, 255])
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    /// Valid PDF header padded to exactly `len` bytes.
    fn pdf_of_len(len: usize) -> Vec<u8> {
        let mut data = PDF.to_vec();
        data.resize(len, b' ');
        data
    }

    fn validator() -> UploadValidator {
        UploadValidator::new()
    }

    #[test]
    fn test_valid_picture() {
        let data = jpeg();
        let validated = validator()
            .validate(&data, UploadCategory::Picture, Some("me.jpeg"))
            .unwrap();
        assert_eq!(validated.mime_type, "image/jpeg");
        assert_eq!(validated.extension, "jpg");
        assert_eq!(validated.size, data.len());
        let image = validated.image.unwrap();
        assert_eq!((image.width, image.height), (32, 24));
        assert_eq!(image.format, "Jpeg");
        assert_eq!(validated.digest_prefix.len(), 8);
    }

    #[test]
    fn test_size_limit_boundary_per_category() {
        for category in UploadCategory::ALL {
            let max = category.policy().max_bytes;
            assert!(validator().validate_size(max, category).is_ok());
            assert_eq!(
                validator().validate_size(max + 1, category),
                Err(ValidationError::SizeExceeded { size: max + 1, max })
            );
        }
    }

    #[test]
    fn test_document_exactly_at_limit_passes() {
        let data = pdf_of_len(10 * 1024 * 1024);
        let validated = validator()
            .validate(&data, UploadCategory::Document, Some("cv.pdf"))
            .unwrap();
        assert_eq!(validated.mime_type, "application/pdf");

        let data = pdf_of_len(10 * 1024 * 1024 + 1);
        assert!(matches!(
            validator().validate(&data, UploadCategory::Document, Some("cv.pdf")),
            Err(ValidationError::SizeExceeded { .. })
        ));
    }

    #[test]
    fn test_size_checked_before_extension() {
        let data = vec![0u8; 2 * 1024 * 1024 + 1];
        assert!(matches!(
            validator().validate(&data, UploadCategory::Preview, Some("x.exe")),
            Err(ValidationError::SizeExceeded { .. })
        ));
    }

    #[test]
    fn test_blocked_extension_in_every_category() {
        let data = jpeg();
        for category in UploadCategory::ALL {
            assert_eq!(
                validator().validate(&data, category, Some("x.exe")),
                Err(ValidationError::ExtensionBlocked {
                    extension: "exe".to_string()
                })
            );
        }
        assert!(matches!(
            validator().validate(&data, UploadCategory::Picture, Some("photo.JPG.PHP")),
            Err(ValidationError::ExtensionBlocked { .. })
        ));
    }

    #[test]
    fn test_extension_not_allowed_lists_allowed_set() {
        let err = validator()
            .validate(PDF, UploadCategory::Document, Some("cv.docx"))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExtensionNotAllowed {
                extension: "docx".to_string(),
                category: "document".to_string(),
                allowed: vec!["pdf".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_extension_reported_as_empty() {
        let err = validator()
            .validate(PDF, UploadCategory::Document, Some("cv"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ExtensionNotAllowed { ref extension, .. } if extension.is_empty()
        ));
    }

    #[test]
    fn test_no_filename_skips_extension_stage() {
        let validated = validator()
            .validate(PDF, UploadCategory::Document, None)
            .unwrap();
        assert_eq!(validated.extension, "pdf");
    }

    #[test]
    fn test_jpg_name_with_pdf_bytes_is_mismatch() {
        let err = validator()
            .validate(PDF, UploadCategory::Picture, Some("x.jpg"))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ContentTypeMismatch { ref detected, .. } if detected == "application/pdf"
        ));
    }

    #[test]
    fn test_undetectable_content() {
        assert_eq!(
            validator().validate(b"plain text resume", UploadCategory::Document, Some("cv.pdf")),
            Err(ValidationError::ContentUndetected)
        );
    }

    #[test]
    fn test_corrupt_image_rejected() {
        let data = png();
        let truncated = &data[..data.len() / 2];
        assert!(matches!(
            validator().validate(truncated, UploadCategory::Picture, Some("x.png")),
            Err(ValidationError::ImageCorrupt(_))
        ));
    }

    #[test]
    fn test_image_over_category_pixel_cap_rejected() {
        // 3000 x 3000 fits pictures but not previews.
        let data = png_declaring(3000, 3000);
        let err = validator()
            .validate(&data, UploadCategory::Preview, Some("big.png"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::ImageCorrupt(_)));

        let data = png_declaring(12_000, 12_000);
        for category in [UploadCategory::Picture, UploadCategory::Preview] {
            assert!(matches!(
                validator().validate(&data, category, Some("big.png")),
                Err(ValidationError::ImageCorrupt(_))
            ));
        }
    }

    #[test]
    fn test_preview_accepts_pdf_without_decode() {
        let validated = validator()
            .validate(PDF, UploadCategory::Preview, Some("page.pdf"))
            .unwrap();
        assert_eq!(validated.mime_type, "application/pdf");
        assert_eq!(validated.image, None);
    }

    #[test]
    fn test_digest_prefix_is_stable() {
        // SHA-256("") = e3b0c442...
        assert_eq!(digest_prefix(b""), "e3b0c442");
        assert_eq!(digest_prefix(PDF), digest_prefix(PDF));
    }
}
