//! Directory flattening plan (§4.6.4): move every file under `root` up into
//! `root` itself, dropping now-empty subdirectories, with conflicts resolved
//! through the shared reservation set exactly like rename.

use crate::atomic_fs::ReservationSet;
use crate::collector;
use crate::model::{ConflictPolicy, ExtensionSet, PlanItem};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FlattenRequest {
    pub root: PathBuf,
    #[serde(default = "default_conflict_policy")]
    pub conflict_policy: ConflictPolicy,
}

fn default_conflict_policy() -> ConflictPolicy {
    ConflictPolicy::Sequence
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlattenExtra {
    pub original_depth: usize,
}

fn depth_under(root: &std::path::Path, path: &std::path::Path) -> usize {
    crate::path::relativize(root, path)
        .map(|rel| rel.components().count().saturating_sub(1))
        .unwrap_or(0)
}

pub fn plan(request: &FlattenRequest) -> Vec<PlanItem<FlattenExtra>> {
    let outcome = collector::collect(&[request.root.clone()], true, &ExtensionSet::all());
    let reservations = ReservationSet::new();

    outcome
        .files
        .into_iter()
        .map(|file| {
            let depth = depth_under(&request.root, &file.path);
            if depth == 0 {
                return PlanItem::skipped(
                    file.path.clone(),
                    "already directly under the root",
                    FlattenExtra { original_depth: depth },
                );
            }
            let file_name = file.path.file_name().unwrap_or_default();
            let desired = request.root.join(file_name);
            match reservations.resolve(&desired, request.conflict_policy) {
                Some(dest) => PlanItem::ready(file.path.clone(), Some(dest), FlattenExtra { original_depth: depth }),
                None => PlanItem::skipped(
                    file.path.clone(),
                    "destination already exists",
                    FlattenExtra { original_depth: depth },
                ),
            }
        })
        .collect()
}
