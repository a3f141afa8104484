//! Magic-number content detection.
//!
//! The declared filename and client Content-Type are never consulted; only the
//! leading bytes of the buffer decide the type.

/// File type recognised from the content itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedContent {
    pub mime_type: &'static str,
    /// Canonical extension for `mime_type`, without the dot (`jpg` for JPEG)
    pub extension: &'static str,
}

impl DetectedContent {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Detect the file type from magic numbers, `None` when unrecognised.
pub fn sniff(data: &[u8]) -> Option<DetectedContent> {
    infer::get(data).map(|kind| DetectedContent {
        mime_type: kind.mime_type(),
        extension: kind.extension(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_signatures() {
        let jpeg = sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");
        assert_eq!(jpeg.extension, "jpg");
        assert!(jpeg.is_image());

        let png = sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        assert_eq!(png.mime_type, "image/png");
        assert_eq!(png.extension, "png");

        let gif = sniff(b"GIF89a\x01\x00\x01\x00").unwrap();
        assert_eq!(gif.mime_type, "image/gif");

        let pdf = sniff(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n").unwrap();
        assert_eq!(pdf.mime_type, "application/pdf");
        assert_eq!(pdf.extension, "pdf");
        assert!(!pdf.is_image());
    }

    #[test]
    fn test_sniff_ignores_unknown_content() {
        assert_eq!(sniff(b"just some text"), None);
        assert_eq!(sniff(&[]), None);
    }

    #[test]
    fn test_sniff_detects_executables() {
        // Windows PE header
        let exe = sniff(b"MZ\x90\x00\x03\x00\x00\x00").unwrap();
        assert!(!exe.is_image());
        assert_ne!(exe.mime_type, "application/pdf");
    }
}
