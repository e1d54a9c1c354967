use crate::atomic_fs;
use crate::error::EngineResult;
use crate::model::ExecResult;
use crate::planner::rename::{plan, RenameExtra, RenameRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &RenameRequest) -> Vec<crate::model::PlanItem<RenameExtra>> {
    plan(request, chrono::Utc::now().naive_utc())
}

pub fn execute(request: &RenameRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request, chrono::Utc::now().naive_utc());
    Ok(crate::executor::execute("rename", items, state, progress, |item| {
        let dest = item
            .destination
            .as_ref()
            .ok_or_else(|| "rename item missing destination".to_string())?;
        atomic_fs::move_atomic(&item.source, dest).map_err(|e| e.to_string())
    }))
}
