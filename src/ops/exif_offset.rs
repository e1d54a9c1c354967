use crate::atomic_fs;
use crate::error::EngineResult;
use crate::exif;
use crate::model::ExecResult;
use crate::planner::exif_offset::{plan, ExifOffsetExtra, ExifOffsetRequest};
use crate::progress::SharedProgressSink;
use crate::state::EngineState;

pub fn preview(request: &ExifOffsetRequest) -> Vec<crate::model::PlanItem<ExifOffsetExtra>> {
    plan(request)
}

pub fn execute(request: &ExifOffsetRequest, state: &EngineState, progress: &SharedProgressSink) -> EngineResult<ExecResult> {
    state.reset();
    let items = plan(request);
    Ok(crate::executor::execute("exifOffset", items, state, progress, |item| {
        let bytes = std::fs::read(&item.source).map_err(|e| e.to_string())?;
        let shifted = exif::apply_datetime_offset(&bytes, item.extras.delta_seconds).map_err(|e| e.to_string())?;
        let Some(new_bytes) = shifted else {
            return Err("no datetime tag was present at execution time".to_string());
        };
        let dest = item.destination.as_ref().unwrap_or(&item.source);
        atomic_fs::write_atomic(dest, &new_bytes).map_err(|e| e.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_sink;

    fn jpeg_with_datetime(dt: &str) -> Vec<u8> {
        let mut dt_bytes = dt.as_bytes().to_vec();
        dt_bytes.push(0);
        let exif_ifd_offset: u32 = 38;
        let dt_value_offset: u32 = 56;

        let mut tiff: Vec<u8> = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&[0x2A, 0x00]);
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&0x8769u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&exif_ifd_offset.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x9003u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&20u32.to_le_bytes());
        tiff.extend_from_slice(&dt_value_offset.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(&dt_bytes);

        let mut app1 = b"Exif\x00\x00".to_vec();
        app1.extend_from_slice(&tiff);
        let app1_len = (app1.len() + 2) as u16;

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&app1_len.to_be_bytes());
        jpeg.extend_from_slice(&app1);
        jpeg.extend_from_slice(&[0xFF, 0xDA]);
        jpeg.extend_from_slice(&8u16.to_be_bytes());
        jpeg.extend_from_slice(&[1, 0, 0, 0, 0, 0]);
        jpeg.extend_from_slice(&[0x11, 0x22]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[test]
    fn test_execute_shifts_datetime_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_datetime("2024:01:01 00:00:00")).unwrap();

        let request = ExifOffsetRequest {
            inputs: vec![tmp.path().to_path_buf()],
            recursive: true,
            delta_seconds: -3600,
        };
        let state = EngineState::new();
        let sink = null_sink();
        let result = execute(&request, &state, &sink).unwrap();
        assert_eq!(result.succeeded, 1);

        let dt = exif::read_datetimes(&path);
        assert_eq!(dt.date_time_original.as_deref(), Some("2023:12:31 23:00:00"));
    }
}
