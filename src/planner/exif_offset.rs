//! EXIF datetime offset plan (§4.6.5): preview which JPEGs carry a datetime
//! tag at all, since files with none are skipped rather than failed.

use crate::collector;
use crate::exif;
use crate::model::{ExtensionSet, PlanItem, JPEG_EXTENSIONS};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ExifOffsetRequest {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub delta_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExifOffsetExtra {
    pub delta_seconds: i64,
}

pub fn plan(request: &ExifOffsetRequest) -> Vec<PlanItem<ExifOffsetExtra>> {
    let outcome = collector::collect(&request.inputs, request.recursive, &ExtensionSet::from_list(JPEG_EXTENSIONS));

    outcome
        .files
        .into_iter()
        .map(|file| {
            let extra = ExifOffsetExtra { delta_seconds: request.delta_seconds };
            let datetimes = exif::read_datetimes(&file.path);
            if datetimes.is_empty() {
                return PlanItem::skipped(file.path.clone(), "no EXIF datetime present", extra);
            }
            PlanItem::ready(file.path.clone(), Some(file.path.clone()), extra)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exif_offset_plan_skips_images_without_datetime() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.jpg");
        image::DynamicImage::new_rgb8(8, 8).save(&path).unwrap();

        let request = ExifOffsetRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            delta_seconds: 60,
        };
        let items = plan(&request);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, crate::model::ItemStatus::Skipped);
    }
}
