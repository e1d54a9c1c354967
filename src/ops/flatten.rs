use crate::atomic_fs;
use crate::error::EngineResult;
use crate::model::ExecResult;
use crate::planner::flatten::{plan, FlattenExtra, FlattenRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &FlattenRequest) -> Vec<crate::model::PlanItem<FlattenExtra>> {
    plan(request)
}

pub fn execute(request: &FlattenRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request);
    let result = crate::executor::execute("flatten", items, state, progress, |item| {
        let dest = item
            .destination
            .as_ref()
            .ok_or_else(|| "flatten item missing destination".to_string())?;
        atomic_fs::move_atomic(&item.source, dest).map_err(|e| e.to_string())
    });
    prune_empty_dirs(&request.root);
    Ok(result)
}

/// Remove subdirectories left empty by the move, walking bottom-up so a
/// parent only disappears once its children have.
fn prune_empty_dirs(root: &std::path::Path) {
    let mut dirs: Vec<_> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    dirs.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
    for dir in dirs {
        let _ = std::fs::remove_dir(&dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConflictPolicy;
    use crate::progress::null_sink;
    use std::fs;

    #[test]
    fn test_execute_flattens_and_prunes_empty_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("photo.jpg"), b"x").unwrap();

        let request = FlattenRequest {
            root: tmp.path().to_path_buf(),
            conflict_policy: ConflictPolicy::Sequence,
        };
        let state = EngineState::new();
        let sink = null_sink();
        let result = execute(&request, &state, &sink).unwrap();
        assert_eq!(result.succeeded, 1);
        assert!(tmp.path().join("photo.jpg").exists());
        assert!(!tmp.path().join("a").exists());
    }
}
