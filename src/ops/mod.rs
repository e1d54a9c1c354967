//! Thin preview/execute façades (§4.8) over the planner + executor, one per
//! operation. Each mirrors the teacher's IPC command style — a small
//! function doing real work with `?`/`map_err`, no business logic of its
//! own — just with no Tauri binding, per the engine's scope.

pub mod compress;
pub mod delete;
pub mod exif_offset;
pub mod flatten;
pub mod metadata_strip;
pub mod rename;
