//! Atomic filesystem writes and the sequence-suffix conflict allocator (§4.3).
//! The write discipline mirrors the settings store's temp-file-then-rename
//! idiom, generalized to arbitrary byte payloads and to copy-then-replace for
//! cross-volume moves.

use crate::model::ConflictPolicy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_path_for(dest: &Path) -> PathBuf {
    let pid = std::process::id();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".tmp.{pid}.{counter}"));
    dest.with_file_name(name)
}

/// Write `bytes` to `dest` atomically: write to a sibling temp file, fsync,
/// then rename over the destination. On any failure the temp file is removed
/// and `dest` is left untouched.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path_for(dest);
    let result = (|| {
        let mut f = std::fs::File::create(&tmp)?;
        use std::io::Write;
        f.write_all(bytes)?;
        f.sync_all()?;
        std::fs::rename(&tmp, dest)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Copy `source` to `dest` atomically via the same temp-then-rename
/// discipline, falling back to cross-volume copy when `source` and `dest`
/// are not on the same filesystem (rename would otherwise fail with EXDEV).
pub fn copy_atomic(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = temp_path_for(dest);
    let result = (|| {
        std::fs::copy(source, &tmp)?;
        std::fs::rename(&tmp, dest)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Move `source` to `dest`, atomically renaming when possible and falling
/// back to copy-then-delete across volumes.
pub fn move_atomic(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_atomic(source, dest)?;
            std::fs::remove_file(source)
        }
    }
}

/// Reserves destination paths across a single plan/run so that sequence-suffix
/// resolution never hands out the same destination twice, even across items
/// whose filesystem state hasn't changed yet.
#[derive(Default)]
pub struct ReservationSet {
    reserved: Mutex<HashSet<PathBuf>>,
}

impl ReservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `desired` against `policy`, returning the final destination (or
    /// `None` when `policy = Skip` and `desired` is already taken).
    pub fn resolve(&self, desired: &Path, policy: ConflictPolicy) -> Option<PathBuf> {
        let taken = |p: &Path| p.exists() || self.reserved.lock().unwrap().contains(p);

        if !taken(desired) {
            self.reserve(desired);
            return Some(desired.to_path_buf());
        }

        match policy {
            ConflictPolicy::Overwrite => {
                self.reserve(desired);
                Some(desired.to_path_buf())
            }
            ConflictPolicy::Skip => None,
            ConflictPolicy::Sequence => {
                let stem = desired
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let ext = desired.extension().map(|e| e.to_string_lossy().to_string());
                let parent = desired.parent().unwrap_or_else(|| Path::new(""));

                let mut n: u64 = 1;
                loop {
                    let name = match &ext {
                        Some(ext) => format!("{stem}_no{n}.{ext}"),
                        None => format!("{stem}_no{n}"),
                    };
                    let candidate = parent.join(name);
                    if !taken(&candidate) {
                        self.reserve(&candidate);
                        return Some(candidate);
                    }
                    n += 1;
                }
            }
        }
    }

    fn reserve(&self, path: &Path) {
        self.reserved.lock().unwrap().insert(path.to_path_buf());
    }
}
