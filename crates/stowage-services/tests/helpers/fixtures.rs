//! Test fixtures: generated images and a minimal PDF.

use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

/// PNG with noisy pixels so the compressed data is not trivially small.
pub fn create_test_png(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
    });
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encoding PNG failed");
    Bytes::from(buffer)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 90]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("encoding JPEG failed");
    Bytes::from(buffer)
}

/// PNG cut in half: valid signature, broken image data.
pub fn create_truncated_png() -> Bytes {
    let png = create_test_png(64, 64);
    png.slice(..png.len() / 2)
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// A few hundred bytes of PNG whose header declares `width` x `height`.
pub fn create_png_declaring(width: u32, height: u32) -> Bytes {
    let mut png = create_test_png(8, 8).to_vec();
    png[16..20].copy_from_slice(&width.to_be_bytes());
    png[20..24].copy_from_slice(&height.to_be_bytes());
    let crc = crc32(&png[12..29]);
    png[29..33].copy_from_slice(&crc.to_be_bytes());
    Bytes::from(png)
}

/// Minimal valid PDF.
pub fn create_test_pdf() -> Bytes {
    Bytes::from_static(
        b"%PDF-1.4
1 0 obj
<< /Type /Catalog /Pages 2 0 R >>
endobj
2 0 obj
<< /Type /Pages /Kids [3 0 R] /Count 1 >>
endobj
3 0 obj
<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>
endobj
trailer
<< /Size 4 /Root 1 0 R >>
%%EOF
",
    )
}

/// `len` bytes of plain text; no recognisable signature.
pub fn create_blob(len: usize) -> Bytes {
    Bytes::from(vec![b'a'; len])
}
