//! Settings Store (§4.10): a small JSON document of user defaults, persisted
//! atomically the same way the teacher's `projects::manager::write_config`
//! does (temp file + rename), resolved through `dirs::config_dir()` with a
//! `dirs::home_dir()` fallback for platforms where the former is unset.

use crate::model::ConflictPolicy;
use crate::planner::rename::DatetimeSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const APP_DIR_NAME: &str = "snapwright";
const SETTINGS_FILE_NAME: &str = "settings.json";
const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_conflict_policy")]
    pub default_conflict_policy: ConflictPolicy,
    #[serde(default = "default_rename_template")]
    pub default_rename_template: String,
    #[serde(default = "default_datetime_source")]
    pub default_datetime_source: DatetimeSource,
    #[serde(default = "default_quality")]
    pub last_compress_quality: u8,
    #[serde(default = "default_resize_percent")]
    pub last_resize_percent: u32,
}

fn default_conflict_policy() -> ConflictPolicy {
    ConflictPolicy::Sequence
}

fn default_rename_template() -> String {
    "{capture_date:YYYY-MM-DD}_{seq:4}".to_string()
}

fn default_datetime_source() -> DatetimeSource {
    DatetimeSource::CaptureThenModified
}

fn default_quality() -> u8 {
    85
}

fn default_resize_percent() -> u32 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_conflict_policy: default_conflict_policy(),
            default_rename_template: default_rename_template(),
            default_datetime_source: default_datetime_source(),
            last_compress_quality: default_quality(),
            last_resize_percent: default_resize_percent(),
        }
    }
}

/// Resolve the directory settings.json lives under, creating nothing yet.
pub fn settings_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().expect("home dir must exist").join(".config"))
        .join(APP_DIR_NAME)
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILE_NAME)
}

pub fn load(dir: &Path) -> Settings {
    let path = settings_path(dir);
    match std::fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
        Err(_) => Settings::default(),
    }
}

pub fn save(dir: &Path, settings: &Settings) -> std::io::Result<()> {
    let path = settings_path(dir);
    let bytes = serde_json::to_vec_pretty(settings).expect("Settings always serializes");
    crate::atomic_fs::write_atomic(&path, &bytes)
}

/// Debounces repeated saves (e.g. from a live-editing UI) so a burst of
/// changes collapses into the last value written at most once per interval.
pub struct SettingsStore {
    dir: PathBuf,
    last_write: Mutex<Option<Instant>>,
}

impl SettingsStore {
    pub fn new(dir: PathBuf) -> Self {
        SettingsStore {
            dir,
            last_write: Mutex::new(None),
        }
    }

    pub fn load(&self) -> Settings {
        load(&self.dir)
    }

    /// Persist `settings` unless a write happened within the debounce window;
    /// in that case the caller's value is simply dropped (callers should save
    /// the fully merged Settings, not incremental deltas).
    pub fn save_debounced(&self, settings: &Settings) -> std::io::Result<bool> {
        let mut guard = self.last_write.lock().unwrap();
        if let Some(last) = *guard {
            if last.elapsed() < DEBOUNCE_INTERVAL {
                return Ok(false);
            }
        }
        save(&self.dir, settings)?;
        *guard = Some(Instant::now());
        Ok(true)
    }

    pub fn flush(&self, settings: &Settings) -> std::io::Result<()> {
        save(&self.dir, settings)?;
        *self.last_write.lock().unwrap() = Some(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = load(tmp.path());
        assert_eq!(settings.last_compress_quality, 85);
    }

    #[test]
    fn test_save_then_load_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.last_compress_quality = 42;
        save(tmp.path(), &settings).unwrap();
        let loaded = load(tmp.path());
        assert_eq!(loaded.last_compress_quality, 42);
    }

    #[test]
    fn test_debounced_save_skips_rapid_repeats() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(tmp.path().to_path_buf());
        let settings = Settings::default();
        assert!(store.save_debounced(&settings).unwrap());
        assert!(!store.save_debounced(&settings).unwrap());
    }
}
