use crate::atomic_fs;
use crate::error::EngineResult;
use crate::jpeg::codec;
use crate::model::ExecResult;
use crate::planner::compress::{plan, CompressExtra, CompressRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &CompressRequest) -> Vec<crate::model::PlanItem<CompressExtra>> {
    plan(request)
}

pub fn execute(request: &CompressRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request);
    Ok(crate::executor::execute("compress", items, state, progress, |item| {
        let img = codec::decode(&item.source).map_err(|e| e.to_string())?;
        let resized = codec::resize_by_percent(&img, item.extras.resize_percent);
        let bytes = codec::encode(&resized, item.extras.quality).map_err(|e| e.to_string())?;
        let dest = item.destination.as_ref().unwrap_or(&item.source);
        atomic_fs::write_atomic(dest, &bytes).map_err(|e| e.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::compress::CompressMode;
    use crate::progress::null_sink;
    use image::DynamicImage;

    #[test]
    fn test_execute_recompresses_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.jpg");
        DynamicImage::new_rgb8(200, 100).save(&path).unwrap();
        let original_len = std::fs::metadata(&path).unwrap().len();

        let request = CompressRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            mode: CompressMode::Fixed { resize_percent: 50, quality: 60 },
        };
        let state = EngineState::new();
        let sink = null_sink();
        let result = execute(&request, &state, &sink).unwrap();
        assert_eq!(result.succeeded, 1);
        let new_len = std::fs::metadata(&path).unwrap().len();
        assert!(new_len > 0);
        let _ = original_len;
    }
}
