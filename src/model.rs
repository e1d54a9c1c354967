use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Extensions accepted by the rename operation (images + videos), lowercase, no dot.
pub const RENAME_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "tif", "tiff", "bmp", "heic", "heif", "dng", "cr2",
    "cr3", "nef", "arw", "raf", "mp4", "mov", "m4v", "avi", "mkv", "wmv", "mts", "m2ts", "mpg",
    "mpeg", "webm",
];

/// Extensions accepted by compress / exifOffset / metadataStrip: JPEG only.
pub const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// A case-insensitive set of extensions (no leading dot). `None` means "accept all".
#[derive(Debug, Clone)]
pub struct ExtensionSet(Option<std::collections::HashSet<String>>);

impl ExtensionSet {
    pub fn all() -> Self {
        ExtensionSet(None)
    }

    pub fn from_list(exts: &[&str]) -> Self {
        ExtensionSet(Some(exts.iter().map(|e| e.to_lowercase()).collect()))
    }

    pub fn matches(&self, path: &std::path::Path) -> bool {
        match &self.0 {
            None => true,
            Some(set) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| set.contains(&e.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

/// A file discovered by the collector: its absolute path, size, and mtime.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    pub modified: std::time::SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictPolicy {
    Overwrite,
    Sequence,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemStatus {
    Ready,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// A single row of planner output, shared shape across all six operations.
/// `extras` carries operation-specific data (e.g. computed datetime shift).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem<Extra = serde_json::Value> {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub status: ItemStatus,
    pub reason: Option<String>,
    pub extras: Extra,
}

impl<Extra> PlanItem<Extra> {
    pub fn ready(source: PathBuf, destination: Option<PathBuf>, extras: Extra) -> Self {
        PlanItem {
            source,
            destination,
            status: ItemStatus::Ready,
            reason: None,
            extras,
        }
    }

    pub fn skipped(source: PathBuf, reason: impl Into<String>, extras: Extra) -> Self {
        PlanItem {
            source,
            destination: None,
            status: ItemStatus::Skipped,
            reason: Some(reason.into()),
            extras,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecDetail {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub status: ExecStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub canceled: bool,
    pub details: Vec<ExecDetail>,
}

impl ExecResult {
    pub fn record(&mut self, detail: ExecDetail) {
        self.processed += 1;
        match detail.status {
            ExecStatus::Succeeded => self.succeeded += 1,
            ExecStatus::Failed => self.failed += 1,
            ExecStatus::Skipped => self.skipped += 1,
        }
        self.details.push(detail);
    }
}

/// Category of EXIF/JPEG metadata a MetadataStrip request can remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataCategory {
    Gps,
    CameraLens,
    Software,
    AuthorCopyright,
    Comments,
    Thumbnail,
    Iptc,
    Xmp,
    ShootingSettings,
    CaptureDateTime,
}

/// Progress event emitted by the Executor through the Progress Bus.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationProgressEvent {
    pub operation: &'static str,
    pub processed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub current_path: Option<PathBuf>,
    pub done: bool,
    pub canceled: bool,
}
