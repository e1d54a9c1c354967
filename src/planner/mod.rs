//! Plan builders for the six operations (§4.6). Each submodule turns a request
//! plus the file list from the collector (§4.2) into a `Vec<PlanItem<_>>` —
//! read-only, deterministic, and safe to call repeatedly for a preview.

pub mod compress;
pub mod delete;
pub mod exif_offset;
pub mod flatten;
pub mod metadata_strip;
pub mod rename;

use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::time::SystemTime;

/// Turn a `SystemTime` into a `NaiveDateTime`, used wherever a plan needs a
/// filesystem mtime expressed as wall-clock time.
pub fn system_time_to_naive(t: SystemTime) -> NaiveDateTime {
    let secs = t
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc())
}

/// Shared collector front-matter every operation's plan request has: which
/// files to operate on and whether to recurse into subdirectories.
#[derive(Debug, Clone)]
pub struct InputSpec {
    pub inputs: Vec<PathBuf>,
    pub recursive: bool,
}
