use crate::atomic_fs;
use crate::error::EngineResult;
use crate::exif;
use crate::model::ExecResult;
use crate::planner::metadata_strip::{plan, MetadataStripExtra, MetadataStripRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &MetadataStripRequest) -> Vec<crate::model::PlanItem<MetadataStripExtra>> {
    plan(request)
}

pub fn execute(request: &MetadataStripRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request);
    Ok(crate::executor::execute("metadataStrip", items, state, progress, |item| {
        let bytes = std::fs::read(&item.source).map_err(|e| e.to_string())?;
        let stripped = exif::strip_categories(&bytes, &item.extras.categories_present).map_err(|e| e.to_string())?;
        let dest = item.destination.as_ref().unwrap_or(&item.source);
        atomic_fs::write_atomic(dest, &stripped).map_err(|e| e.to_string())
    }))
}
