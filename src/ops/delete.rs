use crate::atomic_fs;
use crate::error::EngineResult;
use crate::model::ExecResult;
use crate::planner::delete::{plan, DeleteExtra, DeleteMode, DeleteRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &DeleteRequest) -> Vec<crate::model::PlanItem<DeleteExtra>> {
    plan(request)
}

pub fn execute(request: &DeleteRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request);
    Ok(crate::executor::execute("delete", items, state, progress, |item| {
        match request.mode {
            DeleteMode::Direct => std::fs::remove_file(&item.source).map_err(|e| e.to_string()),
            DeleteMode::Trash | DeleteMode::Retreat => {
                let dest = item
                    .destination
                    .as_ref()
                    .ok_or_else(|| "delete item missing destination".to_string())?;
                atomic_fs::move_atomic(&item.source, dest).map_err(|e| e.to_string())
            }
        }
    }))
}
