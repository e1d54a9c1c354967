//! EXIF read path (§4.5), grounded on the import pipeline's `extract_jpeg_exif`:
//! same `exif::Reader::read_from_container` + `catch_unwind` defensive
//! wrapping, extended to read all three datetime tags and to detect which
//! metadata categories are present (for the MetadataStrip planner).

use super::tags::{self, IfdKind};
use crate::model::MetadataCategory;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ExifDateTimes {
    pub date_time: Option<String>,
    pub date_time_original: Option<String>,
    pub date_time_digitized: Option<String>,
}

impl ExifDateTimes {
    pub fn is_empty(&self) -> bool {
        self.date_time.is_none() && self.date_time_original.is_none() && self.date_time_digitized.is_none()
    }
}

fn ifd_context(kind: IfdKind) -> exif::Context {
    match kind {
        IfdKind::Ifd0 | IfdKind::Ifd1 => exif::Context::Tiff,
        IfdKind::ExifIfd => exif::Context::Exif,
        IfdKind::GpsIfd => exif::Context::Gps,
    }
}

fn ifd_location(kind: IfdKind) -> exif::In {
    match kind {
        IfdKind::Ifd1 => exif::In::THUMBNAIL,
        _ => exif::In::PRIMARY,
    }
}

fn read_container(path: &Path) -> Option<exif::Exif> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = std::io::BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader).ok()
}

fn ascii_value(exif: &exif::Exif, kind: IfdKind, tag_id: u16) -> Option<String> {
    let tag = exif::Tag(ifd_context(kind), tag_id);
    let field = exif.get_field(tag, ifd_location(kind))?;
    match &field.value {
        exif::Value::Ascii(vecs) => {
            let raw = vecs.first()?;
            let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            std::str::from_utf8(&raw[..end]).ok().map(|s| s.to_string())
        }
        _ => None,
    }
}

/// Read all three datetime tags, never panicking on a corrupt file.
pub fn read_datetimes(path: &Path) -> ExifDateTimes {
    match std::panic::catch_unwind(|| read_datetimes_inner(path)) {
        Ok(dt) => dt,
        Err(_) => {
            tracing::warn!("panic reading EXIF datetimes from {:?}", path);
            ExifDateTimes::default()
        }
    }
}

fn read_datetimes_inner(path: &Path) -> ExifDateTimes {
    let Some(exif) = read_container(path) else {
        return ExifDateTimes::default();
    };
    ExifDateTimes {
        date_time: ascii_value(&exif, IfdKind::Ifd0, tags::DATE_TIME),
        date_time_original: ascii_value(&exif, IfdKind::ExifIfd, tags::DATE_TIME_ORIGINAL),
        date_time_digitized: ascii_value(&exif, IfdKind::ExifIfd, tags::DATE_TIME_DIGITIZED),
    }
}

/// Determine which metadata categories this JPEG actually carries, used by
/// the MetadataStrip planner to skip files with nothing to strip.
pub fn detect_found_categories(path: &Path) -> HashSet<MetadataCategory> {
    match std::panic::catch_unwind(|| detect_found_categories_inner(path)) {
        Ok(set) => set,
        Err(_) => {
            tracing::warn!("panic detecting metadata categories in {:?}", path);
            HashSet::new()
        }
    }
}

fn detect_found_categories_inner(path: &Path) -> HashSet<MetadataCategory> {
    use MetadataCategory::*;
    let mut found = HashSet::new();

    let Some(exif) = read_container(path) else {
        return found;
    };

    let all = [
        Gps,
        CameraLens,
        Software,
        AuthorCopyright,
        Comments,
        Thumbnail,
        ShootingSettings,
        CaptureDateTime,
    ];
    for category in all {
        let has_any = tags::tags_for_category(category).iter().any(|(kind, id)| {
            let tag = exif::Tag(ifd_context(*kind), *id);
            exif.get_field(tag, ifd_location(*kind)).is_some()
        });
        if has_any {
            found.insert(category);
        }
    }

    if let Ok(bytes) = std::fs::read(path) {
        if let Ok(stream) = crate::jpeg::JpegStream::parse(&bytes) {
            if stream
                .segments
                .iter()
                .any(|s| s.marker == crate::jpeg::stream::markers::APP13 && s.payload.starts_with(b"Photoshop 3.0"))
            {
                found.insert(Iptc);
            }
            if stream.segments.iter().any(|s| {
                s.marker == crate::jpeg::stream::markers::APP1
                    && s.payload.starts_with(b"http://ns.adobe.com/xap/1.0/\0")
            }) {
                found.insert(Xmp);
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_jpeg_with_datetime_original(dt: &str) -> tempfile::NamedTempFile {
        assert_eq!(dt.len(), 19);
        let mut dt_bytes = dt.as_bytes().to_vec();
        dt_bytes.push(0);

        let exif_ifd_offset: u32 = 38;
        let dt_value_offset: u32 = 56;

        let mut tiff: Vec<u8> = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&[0x2A, 0x00]);
        tiff.extend_from_slice(&8u32.to_le_bytes());

        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());

        tiff.extend_from_slice(&0x8769u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&exif_ifd_offset.to_le_bytes());

        tiff.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(tiff.len(), exif_ifd_offset as usize);

        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x9003u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&20u32.to_le_bytes());
        tiff.extend_from_slice(&dt_value_offset.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        assert_eq!(tiff.len(), dt_value_offset as usize);

        tiff.extend_from_slice(&dt_bytes);

        let mut app1_data = b"Exif\x00\x00".to_vec();
        app1_data.extend_from_slice(&tiff);
        let app1_len = (app1_data.len() + 2) as u16;

        let mut jpeg: Vec<u8> = Vec::new();
        jpeg.extend_from_slice(&[0xFF, 0xD8]);
        jpeg.extend_from_slice(&[0xFF, 0xE1]);
        jpeg.extend_from_slice(&app1_len.to_be_bytes());
        jpeg.extend_from_slice(&app1_data);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);

        let f = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        std::fs::write(f.path(), &jpeg).unwrap();
        f
    }

    #[test]
    fn test_read_datetimes_extracts_original() {
        let f = write_jpeg_with_datetime_original("2023:01:15 10:30:00");
        let dt = read_datetimes(f.path());
        assert_eq!(dt.date_time_original.as_deref(), Some("2023:01:15 10:30:00"));
    }

    #[test]
    fn test_read_datetimes_missing_returns_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.jpg");
        image::DynamicImage::new_rgb8(10, 10).save(&path).unwrap();
        let dt = read_datetimes(&path);
        assert!(dt.is_empty());
    }

    #[test]
    fn test_detect_categories_finds_capture_datetime() {
        let f = write_jpeg_with_datetime_original("2023:01:15 10:30:00");
        let found = detect_found_categories(f.path());
        assert!(found.contains(&MetadataCategory::CaptureDateTime));
    }

    #[test]
    fn test_detect_categories_empty_for_no_exif() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.jpg");
        image::DynamicImage::new_rgb8(10, 10).save(&path).unwrap();
        assert!(detect_found_categories(&path).is_empty());
    }
}
