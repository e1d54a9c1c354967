//! EXIF rewrite path (§4.5): shifting the three datetime tags and stripping
//! metadata categories, both via an in-memory splice of the first EXIF APP1
//! segment back into the JpegStream (§4.4).

use super::tags::{self, IfdKind};
use super::tiff::TiffDocument;
use crate::error::CodecError;
use crate::jpeg::stream::markers;
use crate::jpeg::JpegStream;
use crate::model::MetadataCategory;
use chrono::{Datelike, Duration, NaiveDateTime};

const EXIF_PREFIX: &[u8] = b"Exif\x00\x00";
const MAX_APP1_SEGMENT_LEN: usize = 65533;

fn find_exif_app1_index(stream: &JpegStream) -> Option<usize> {
    stream
        .segments
        .iter()
        .position(|s| s.marker == markers::APP1 && s.payload.starts_with(EXIF_PREFIX))
}

pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if s.len() < 19 {
        return None;
    }
    let date = s[..10].replace(':', "-");
    let rest = format!("{date} {}", &s[11..19]);
    NaiveDateTime::parse_from_str(&rest, "%Y-%m-%d %H:%M:%S").ok()
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y:%m:%d %H:%M:%S").to_string()
}

/// Shift all present datetime tags by `delta_seconds`. Returns `Ok(None)` when
/// no datetime tag is present (caller maps this to the "no datetime" skip
/// reason). Returns `Err(CodecError::ExifTooLarge)` when the resulting APP1
/// exceeds the segment size cap, or a generic codec error on out-of-range
/// results or a malformed container.
pub fn apply_datetime_offset(jpeg: &[u8], delta_seconds: i64) -> Result<Option<Vec<u8>>, CodecError> {
    let mut stream = JpegStream::parse(jpeg)?;
    let Some(idx) = find_exif_app1_index(&stream) else {
        return Ok(None);
    };

    let tiff_bytes = &stream.segments[idx].payload[EXIF_PREFIX.len()..];
    let mut doc = TiffDocument::parse(tiff_bytes)?;

    let mut touched = false;
    for (kind, tag_id) in tags::datetime_tags() {
        let ifd = match kind {
            IfdKind::Ifd0 => &mut doc.ifd0,
            IfdKind::ExifIfd => match doc.exif_ifd.as_mut() {
                Some(i) => i,
                None => continue,
            },
            _ => unreachable!("datetime tags only live in IFD0/ExifIFD"),
        };
        let Some(entry) = ifd.find_mut(tag_id) else {
            continue;
        };
        let Some(text) = entry.as_ascii() else {
            continue;
        };
        let Some(parsed) = parse_datetime(&text) else {
            continue;
        };
        let shifted = parsed
            .checked_add_signed(Duration::seconds(delta_seconds))
            .ok_or_else(|| CodecError::Decode("datetime out of range".to_string()))?;
        if !(1970..=9999).contains(&shifted.year()) {
            return Err(CodecError::Decode("datetime out of range".to_string()));
        }
        entry.set_ascii_in_place(&format_datetime(shifted), doc.byte_order);
        touched = true;
    }

    if !touched {
        return Ok(None);
    }

    splice_tiff_back(&mut stream, idx, &doc)?;
    Ok(Some(stream.to_bytes()))
}

/// Remove all tags/segments belonging to `categories` from `jpeg`.
pub fn strip_categories(jpeg: &[u8], categories: &[MetadataCategory]) -> Result<Vec<u8>, CodecError> {
    let mut stream = JpegStream::parse(jpeg)?;

    if categories.contains(&MetadataCategory::Iptc) {
        stream.remove_all(|s| s.marker == markers::APP13 && s.payload.starts_with(b"Photoshop 3.0"));
    }
    if categories.contains(&MetadataCategory::Xmp) {
        stream.remove_all(|s| {
            s.marker == markers::APP1 && s.payload.starts_with(b"http://ns.adobe.com/xap/1.0/\x00")
        });
    }

    let tiff_categories: Vec<MetadataCategory> = categories
        .iter()
        .copied()
        .filter(|c| !matches!(c, MetadataCategory::Iptc | MetadataCategory::Xmp))
        .collect();

    if let Some(idx) = find_exif_app1_index(&stream) {
        if !tiff_categories.is_empty() {
            let tiff_bytes = &stream.segments[idx].payload[EXIF_PREFIX.len()..];
            let mut doc = TiffDocument::parse(tiff_bytes)?;

            for category in &tiff_categories {
                match category {
                    MetadataCategory::Gps => doc.gps_ifd = None,
                    MetadataCategory::Thumbnail => doc.ifd1 = None,
                    _ => {
                        for (kind, tag_id) in tags::tags_for_category(*category) {
                            let ifd = match kind {
                                IfdKind::Ifd0 => Some(&mut doc.ifd0),
                                IfdKind::ExifIfd => doc.exif_ifd.as_mut(),
                                IfdKind::GpsIfd => doc.gps_ifd.as_mut(),
                                IfdKind::Ifd1 => doc.ifd1.as_mut(),
                            };
                            if let Some(ifd) = ifd {
                                ifd.remove(&[tag_id]);
                            }
                        }
                    }
                }
            }

            splice_tiff_back(&mut stream, idx, &doc)?;
        }
    }

    Ok(stream.to_bytes())
}

fn splice_tiff_back(stream: &mut JpegStream, idx: usize, doc: &TiffDocument) -> Result<(), CodecError> {
    let mut payload = EXIF_PREFIX.to_vec();
    payload.extend_from_slice(&doc.serialize());
    if payload.len() + 2 > MAX_APP1_SEGMENT_LEN {
        return Err(CodecError::ExifTooLarge);
    }
    stream.segments[idx].payload = payload;
    Ok(())
}
