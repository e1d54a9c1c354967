//! EXIF tag-ID tables and the category → tag mapping of §4.5. Tag IDs are the
//! raw TIFF field numbers; `IfdKind` records which IFD namespace a tag lives
//! in, since `DateTimeOriginal` (ExifIFD) and e.g. `Make` (IFD0) share the
//! numeric tag space with other namespaces.

use crate::model::MetadataCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IfdKind {
    Ifd0,
    ExifIfd,
    GpsIfd,
    Ifd1,
}

pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const DATE_TIME_DIGITIZED: u16 = 0x9004;
pub const DATE_TIME: u16 = 0x0132;

pub const GPS_INFO_IFD_POINTER: u16 = 0x8825;
pub const EXIF_IFD_POINTER: u16 = 0x8769;

pub const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;

/// The three datetime tags rewritten by the ExifOffset operation, all in ExifIFD
/// except `DateTime` which lives in IFD0.
pub fn datetime_tags() -> [(IfdKind, u16); 3] {
    [
        (IfdKind::Ifd0, DATE_TIME),
        (IfdKind::ExifIfd, DATE_TIME_ORIGINAL),
        (IfdKind::ExifIfd, DATE_TIME_DIGITIZED),
    ]
}

/// Tags (with IFD namespace) dropped for a given category, per the specification's
/// explicit mapping (§4.5). `Gps`/`Thumbnail` remove whole IFDs and are handled
/// separately by the writer; their tag lists here cover the pointer tags only.
pub fn tags_for_category(category: MetadataCategory) -> Vec<(IfdKind, u16)> {
    use IfdKind::*;
    use MetadataCategory::*;
    match category {
        Gps => vec![(Ifd0, GPS_INFO_IFD_POINTER)],
        CameraLens => vec![
            (Ifd0, 0x010F),  // Make
            (Ifd0, 0x0110),  // Model
            (ExifIfd, 0xA433), // LensMake
            (ExifIfd, 0xA434), // LensModel
            (ExifIfd, 0xA432), // LensSpecification
            (ExifIfd, 0xA431), // BodySerialNumber
            (ExifIfd, 0xA435), // LensSerialNumber
        ],
        Software => vec![
            (Ifd0, 0x0131), // Software
            (Ifd0, 0x000B), // ProcessingSoftware
            (Ifd0, 0x013C), // HostComputer
        ],
        AuthorCopyright => vec![
            (Ifd0, 0x013B),    // Artist
            (Ifd0, 0x8298),    // Copyright
            (Ifd0, 0x9C9F),    // OwnerName (XP owner extension)
            (ExifIfd, 0xA430), // CameraOwnerName
        ],
        Comments => vec![
            (ExifIfd, 0x9286), // UserComment
            (Ifd0, 0x010E),    // ImageDescription
            (Ifd0, 0x9C9C),    // XPComment
            (Ifd0, 0x9C9B),    // XPTitle
            (Ifd0, 0x9C9F),    // XPSubject
            (Ifd0, 0x9C9E),    // XPKeywords
            (Ifd0, 0x9C9D),    // XPAuthor
        ],
        Thumbnail => vec![
            (Ifd1, JPEG_INTERCHANGE_FORMAT),
            (Ifd1, JPEG_INTERCHANGE_FORMAT_LENGTH),
        ],
        ShootingSettings => vec![
            (ExifIfd, 0x829A), // ExposureTime
            (ExifIfd, 0x829D), // FNumber
            (ExifIfd, 0x8827), // ISOSpeedRatings
            (ExifIfd, 0x920A), // FocalLength
            (ExifIfd, 0x8822), // ExposureProgram
            (ExifIfd, 0x9207), // MeteringMode
            (ExifIfd, 0x9209), // Flash
            (ExifIfd, 0xA403), // WhiteBalance
            (ExifIfd, 0x9204), // ExposureBiasValue
            (ExifIfd, 0x9205), // MaxApertureValue
            (ExifIfd, 0x9206), // SubjectDistance
            (ExifIfd, 0xA405), // FocalLengthIn35mmFilm
            (ExifIfd, 0xA402), // ExposureMode
            (ExifIfd, 0xA406), // SceneCaptureType
        ],
        CaptureDateTime => vec![
            (Ifd0, DATE_TIME),
            (ExifIfd, DATE_TIME_ORIGINAL),
            (ExifIfd, DATE_TIME_DIGITIZED),
            (ExifIfd, 0x9290), // SubSecTime
            (ExifIfd, 0x9291), // SubSecTimeOriginal
            (ExifIfd, 0x9292), // SubSecTimeDigitized
        ],
        // Iptc/Xmp act on whole JPEG app segments, not TIFF tags; see writer.rs.
        Iptc | Xmp => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shooting_settings_has_fourteen_tags() {
        assert_eq!(
            tags_for_category(MetadataCategory::ShootingSettings).len(),
            14
        );
    }

    #[test]
    fn test_gps_maps_to_pointer_tag() {
        let tags = tags_for_category(MetadataCategory::Gps);
        assert_eq!(tags, vec![(IfdKind::Ifd0, GPS_INFO_IFD_POINTER)]);
    }

    #[test]
    fn test_iptc_and_xmp_have_no_tiff_tags() {
        assert!(tags_for_category(MetadataCategory::Iptc).is_empty());
        assert!(tags_for_category(MetadataCategory::Xmp).is_empty());
    }
}
