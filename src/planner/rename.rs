//! Bulk rename plan (§4.6.1): resolve a capture/modified/exec datetime per
//! file, render the rename template, then resolve destination conflicts
//! through the shared reservation set so a preview and its later execution
//! agree on every destination.

use super::{system_time_to_naive, InputSpec};
use crate::atomic_fs::ReservationSet;
use crate::collector;
use crate::exif;
use crate::model::{ConflictPolicy, ExtensionSet, ItemStatus, PlanItem, RENAME_EXTENSIONS};
use crate::template::{RenameTemplate, RenderContext};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatetimeSource {
    CaptureThenModified,
    ModifiedOnly,
    CurrentTime,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RenameRequest {
    #[serde(flatten)]
    pub input: InputSpecDto,
    pub template: String,
    pub datetime_source: DatetimeSource,
    pub conflict_policy: ConflictPolicy,
    #[serde(default = "default_start_seq")]
    pub start_seq: u32,
}

fn default_start_seq() -> u32 {
    1
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct InputSpecDto {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
}

impl From<InputSpecDto> for InputSpec {
    fn from(dto: InputSpecDto) -> Self {
        InputSpec {
            inputs: dto.inputs,
            recursive: dto.recursive,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameExtra {
    pub used_capture_time: bool,
    pub seq: u32,
}

/// Append `.ext` (preserving its original case) unless the rendered name
/// already ends with it — e.g. a template that spells out `{ext}` itself.
fn append_extension_if_missing(rendered: String, ext: &str) -> String {
    if ext.is_empty() {
        return rendered;
    }
    let suffix = format!(".{ext}");
    if rendered.to_lowercase().ends_with(&suffix.to_lowercase()) {
        rendered
    } else {
        format!("{rendered}{suffix}")
    }
}

fn capture_time(path: &std::path::Path) -> Option<NaiveDateTime> {
    let dt = exif::read_datetimes(path);
    let raw = dt.date_time_original.or(dt.date_time)?;
    exif::parse_datetime(&raw)
}

/// Build the rename plan for `request`, given an execution timestamp (passed
/// in rather than read from the clock so a preview and its execution can use
/// the same instant).
pub fn plan(request: &RenameRequest, exec_time: NaiveDateTime) -> Vec<PlanItem<RenameExtra>> {
    let input: InputSpec = request.input.clone().into();
    let outcome = collector::collect(&input.inputs, input.recursive, &ExtensionSet::from_list(RENAME_EXTENSIONS));
    let template = RenameTemplate::parse(&request.template);
    let reservations = ReservationSet::new();

    let mut items = Vec::with_capacity(outcome.files.len());
    let mut seq = request.start_seq;

    for file in &outcome.files {
        let (rendered_time, used_capture_time) = match request.datetime_source {
            DatetimeSource::CaptureThenModified => match capture_time(&file.path) {
                Some(dt) => (Some(dt), true),
                None => (Some(system_time_to_naive(file.modified)), false),
            },
            DatetimeSource::ModifiedOnly => (Some(system_time_to_naive(file.modified)), false),
            DatetimeSource::CurrentTime => (None, false),
        };

        let stem = file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = file
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        let ctx = RenderContext {
            capture_time: rendered_time,
            exec_time,
            seq,
            orig_stem: &stem,
            ext: &ext,
        };

        let extra = RenameExtra { used_capture_time, seq };

        let Some(rendered) = template.render(&ctx) else {
            items.push(PlanItem::skipped(
                file.path.clone(),
                "rename template produced an empty or invalid name",
                extra,
            ));
            continue;
        };

        let file_name = append_extension_if_missing(rendered, &ext);

        let parent = file.path.parent().unwrap_or_else(|| std::path::Path::new(""));
        let desired = parent.join(&file_name);

        match reservations.resolve(&desired, request.conflict_policy) {
            Some(dest) => {
                let mut item = PlanItem::ready(file.path.clone(), Some(dest), extra);
                if item.destination.as_deref() == Some(file.path.as_path()) {
                    item.status = ItemStatus::Skipped;
                    item.reason = Some("destination equals source".to_string());
                    item.destination = None;
                }
                items.push(item);
            }
            None => items.push(PlanItem::skipped(
                file.path.clone(),
                "destination already exists",
                extra,
            )),
        }

        seq += 1;
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn exec_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_rename_plan_applies_sequential_seq() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(tmp.path().join("b.jpg"), b"x").unwrap();

        let request = RenameRequest {
            input: InputSpecDto {
                inputs: vec![tmp.path().to_path_buf()],
                recursive: true,
            },
            template: "photo_{seq:3}".to_string(),
            datetime_source: DatetimeSource::CurrentTime,
            conflict_policy: ConflictPolicy::Sequence,
            start_seq: 1,
        };

        let items = plan(&request, exec_now());
        assert_eq!(items.len(), 2);
        let names: Vec<_> = items
            .iter()
            .map(|i| i.destination.as_ref().unwrap().file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["photo_001.jpg", "photo_002.jpg"]);
    }

    #[test]
    fn test_rename_plan_skip_on_conflict_with_skip_policy() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(tmp.path().join("fixed.jpg"), b"x").unwrap();

        let request = RenameRequest {
            input: InputSpecDto {
                inputs: vec![tmp.path().join("a.jpg")],
                recursive: false,
            },
            template: "fixed".to_string(),
            datetime_source: DatetimeSource::CurrentTime,
            conflict_policy: ConflictPolicy::Skip,
            start_seq: 1,
        };

        let items = plan(&request, exec_now());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, ItemStatus::Skipped);
    }

    #[test]
    fn test_rename_plan_preserves_original_extension_case() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("IMG.JPG"), b"x").unwrap();

        let request = RenameRequest {
            input: InputSpecDto {
                inputs: vec![tmp.path().join("IMG.JPG")],
                recursive: false,
            },
            template: "{capture_date:YYYY-MM-DD}_{seq:2}".to_string(),
            datetime_source: DatetimeSource::CurrentTime,
            conflict_policy: ConflictPolicy::Sequence,
            start_seq: 1,
        };

        let items = plan(&request, exec_now());
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].destination.as_ref().unwrap().file_name().unwrap().to_string_lossy(),
            "2025-06-01_01.JPG"
        );
    }
}
