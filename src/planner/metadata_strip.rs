//! JPEG metadata stripping plan (§4.6.6): only plan work for the categories a
//! file actually carries, intersected with the categories the caller asked
//! to strip, so a no-op file reports as skipped rather than "ready".

use crate::collector;
use crate::exif;
use crate::model::{ExtensionSet, MetadataCategory, PlanItem, JPEG_EXTENSIONS};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MetadataStripRequest {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub categories: Vec<MetadataCategory>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetadataStripExtra {
    pub categories_present: Vec<MetadataCategory>,
}

pub fn plan(request: &MetadataStripRequest) -> Vec<PlanItem<MetadataStripExtra>> {
    let outcome = collector::collect(&request.inputs, request.recursive, &ExtensionSet::from_list(JPEG_EXTENSIONS));

    outcome
        .files
        .into_iter()
        .map(|file| {
            let found = exif::detect_found_categories(&file.path);
            let to_strip: Vec<MetadataCategory> = request
                .categories
                .iter()
                .copied()
                .filter(|c| found.contains(c))
                .collect();

            if to_strip.is_empty() {
                return PlanItem::skipped(
                    file.path.clone(),
                    "none of the requested categories are present",
                    MetadataStripExtra::default(),
                );
            }
            PlanItem::ready(
                file.path.clone(),
                Some(file.path.clone()),
                MetadataStripExtra { categories_present: to_strip },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_strip_plan_skips_when_nothing_present() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("plain.jpg");
        image::DynamicImage::new_rgb8(8, 8).save(&path).unwrap();

        let request = MetadataStripRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            categories: vec![MetadataCategory::Gps],
        };
        let items = plan(&request);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, crate::model::ItemStatus::Skipped);
    }
}
