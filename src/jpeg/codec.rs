//! Decode/resize/encode path used by the compress operation (§4.4). Grounded
//! on the thumbnail generator's `image::open` + `DynamicImage::thumbnail` +
//! `rotate90/180/270` usage, generalized from a fixed 256×256 box to an
//! arbitrary resize percentage and output quality.

use crate::error::CodecError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder};
use std::io::Cursor;
use std::path::Path;

/// Apply the EXIF orientation tag's rotation/flip so the re-encoded image is
/// upright without carrying a non-1 orientation tag forward.
pub fn apply_orientation(img: DynamicImage, orientation: Option<u16>) -> DynamicImage {
    match orientation {
        Some(2) => img.fliph(),
        Some(3) => img.rotate180(),
        Some(4) => img.flipv(),
        Some(5) => img.rotate90().fliph(),
        Some(6) => img.rotate90(),
        Some(7) => img.rotate270().fliph(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}

/// Decode a JPEG from `path`, wrapped in `catch_unwind` so a malformed file
/// can never take down a worker thread.
pub fn decode(path: &Path) -> Result<DynamicImage, CodecError> {
    match std::panic::catch_unwind(|| image::open(path)) {
        Ok(Ok(img)) => Ok(img),
        Ok(Err(e)) => Err(CodecError::Decode(e.to_string())),
        Err(_) => Err(CodecError::Decode(format!("decoder panicked on {path:?}"))),
    }
}

/// Read just the pixel dimensions, without fully decoding — used by the
/// compress planner's size estimator.
pub fn dimensions(path: &Path) -> Result<(u32, u32), CodecError> {
    let file = std::fs::File::open(path)?;
    let decoder = image::codecs::jpeg::JpegDecoder::new(std::io::BufReader::new(file))
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    Ok(decoder.dimensions())
}

/// Resize `img` to `resize_percent` of its original dimensions (1..=100),
/// using a high-quality Lanczos filter.
pub fn resize_by_percent(img: &DynamicImage, resize_percent: u32) -> DynamicImage {
    if resize_percent >= 100 {
        return img.clone();
    }
    let pct = resize_percent.max(1) as f64 / 100.0;
    let new_w = ((img.width() as f64) * pct).round().max(1.0) as u32;
    let new_h = ((img.height() as f64) * pct).round().max(1.0) as u32;
    img.resize(new_w, new_h, image::imageops::FilterType::Lanczos3)
}

/// Encode `img` as baseline JPEG at `quality` (1..=100) and return the bytes.
pub fn encode(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut Cursor::new(&mut buf), quality);
        encoder
            .encode_image(img)
            .map_err(|e| CodecError::Encode(e.to_string()))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_jpeg(width: u32, height: u32) -> tempfile::NamedTempFile {
        let f = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        let img = DynamicImage::new_rgb8(width, height);
        img.save(f.path()).unwrap();
        f
    }

    #[test]
    fn test_resize_by_percent_halves_dimensions() {
        let img = DynamicImage::new_rgb8(200, 100);
        let resized = resize_by_percent(&img, 50);
        assert_eq!(resized.width(), 100);
        assert_eq!(resized.height(), 50);
    }

    #[test]
    fn test_resize_by_percent_100_is_identity_dimensions() {
        let img = DynamicImage::new_rgb8(64, 64);
        let resized = resize_by_percent(&img, 100);
        assert_eq!((resized.width(), resized.height()), (64, 64));
    }

    #[test]
    fn test_encode_produces_valid_jpeg_magic() {
        let img = DynamicImage::new_rgb8(16, 16);
        let bytes = encode(&img, 80).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_decode_roundtrip_dimensions() {
        let f = make_jpeg(120, 80);
        let img = decode(f.path()).unwrap();
        assert_eq!((img.width(), img.height()), (120, 80));
    }

    #[test]
    fn test_decode_corrupt_file_does_not_panic() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(decode(&path).is_err());
    }

    #[test]
    fn test_apply_orientation_6_rotates_90() {
        let img = DynamicImage::new_rgb8(200, 100);
        let rotated = apply_orientation(img, Some(6));
        assert_eq!((rotated.width(), rotated.height()), (100, 200));
    }
}
