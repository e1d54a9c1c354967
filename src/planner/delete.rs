//! Extension-targeted delete plan (§4.6.2). Three modes: permanent removal,
//! moving into a `.trash` folder at the collection root, or moving into a
//! user-chosen retreat directory — the latter two reuse the atomic move/
//! reservation machinery so "delete" never actually unlinks user data.

use super::InputSpec;
use crate::atomic_fs::ReservationSet;
use crate::collector;
use crate::model::{ConflictPolicy, ExtensionSet, PlanItem};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteMode {
    /// Unlink the file outright.
    Direct,
    /// Move into `<root>/.trash/` preserving the original filename (subject
    /// to conflict resolution).
    Trash,
    /// Move into a caller-supplied retreat directory.
    Retreat,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DeleteRequest {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
    pub extensions: Vec<String>,
    pub mode: DeleteMode,
    pub retreat_dir: Option<PathBuf>,
    #[serde(default = "default_conflict_policy")]
    pub conflict_policy: ConflictPolicy,
}

fn default_conflict_policy() -> ConflictPolicy {
    ConflictPolicy::Sequence
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExtra {
    pub mode_applied: Option<&'static str>,
}

pub fn plan(request: &DeleteRequest) -> Vec<PlanItem<DeleteExtra>> {
    let input = InputSpec {
        inputs: request.inputs.clone(),
        recursive: request.recursive,
    };
    let ext_refs: Vec<&str> = request.extensions.iter().map(|s| s.as_str()).collect();
    let extensions = if ext_refs.is_empty() {
        ExtensionSet::all()
    } else {
        ExtensionSet::from_list(&ext_refs)
    };
    let outcome = collector::collect(&input.inputs, input.recursive, &extensions);
    let reservations = ReservationSet::new();

    let mut items = Vec::with_capacity(outcome.files.len());
    for file in &outcome.files {
        match request.mode {
            DeleteMode::Direct => {
                items.push(PlanItem::ready(
                    file.path.clone(),
                    None,
                    DeleteExtra { mode_applied: Some("direct") },
                ));
            }
            DeleteMode::Trash | DeleteMode::Retreat => {
                let Some(base_dir) = target_dir(request, &file.path) else {
                    items.push(PlanItem::skipped(
                        file.path.clone(),
                        "no retreat directory configured",
                        DeleteExtra::default(),
                    ));
                    continue;
                };
                let file_name = file.path.file_name().unwrap_or_default();
                let desired = base_dir.join(file_name);
                match reservations.resolve(&desired, request.conflict_policy) {
                    Some(dest) => items.push(PlanItem::ready(
                        file.path.clone(),
                        Some(dest),
                        DeleteExtra {
                            mode_applied: Some(if request.mode == DeleteMode::Trash { "trash" } else { "retreat" }),
                        },
                    )),
                    None => items.push(PlanItem::skipped(
                        file.path.clone(),
                        "destination already exists",
                        DeleteExtra::default(),
                    )),
                }
            }
        }
    }
    items
}

fn target_dir(request: &DeleteRequest, file: &std::path::Path) -> Option<PathBuf> {
    match request.mode {
        DeleteMode::Trash => file.parent().map(|p| p.join(".trash")),
        DeleteMode::Retreat => request.retreat_dir.clone(),
        DeleteMode::Direct => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_direct_plan_has_no_destination() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        let request = DeleteRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            extensions: vec!["jpg".to_string()],
            mode: DeleteMode::Direct,
            retreat_dir: None,
            conflict_policy: ConflictPolicy::Sequence,
        };
        let items = plan(&request);
        assert_eq!(items.len(), 1);
        assert!(items[0].destination.is_none());
    }

    #[test]
    fn test_delete_trash_plan_targets_trash_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        let request = DeleteRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            extensions: vec!["jpg".to_string()],
            mode: DeleteMode::Trash,
            retreat_dir: None,
            conflict_policy: ConflictPolicy::Sequence,
        };
        let items = plan(&request);
        assert_eq!(items.len(), 1);
        assert!(items[0].destination.as_ref().unwrap().ends_with(".trash/a.jpg"));
    }

    #[test]
    fn test_delete_retreat_without_dir_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        let request = DeleteRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            extensions: vec!["jpg".to_string()],
            mode: DeleteMode::Retreat,
            retreat_dir: None,
            conflict_policy: ConflictPolicy::Sequence,
        };
        let items = plan(&request);
        assert_eq!(items[0].status, crate::model::ItemStatus::Skipped);
    }
}
