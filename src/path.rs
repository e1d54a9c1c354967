//! Path canonicalization and relative-path derivation (§4.1).

use std::path::{Component, Path, PathBuf};

/// Canonicalize `path` to its native absolute form: resolves `.`/`..`,
/// collapses duplicate separators, and (on the host platform) resolves
/// symlinks. Falls back to a lexical normalization when the path does not
/// exist on disk yet (e.g. a planned destination).
pub fn normalize(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(p) => p,
        Err(_) => lexical_normalize(path),
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Return the component list needed to walk from `base` to `target`.
/// Returns `None` when the two paths share no common root.
pub fn relativize(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = lexical_normalize(base);
    let target = lexical_normalize(target);
    target.strip_prefix(&base).map(|p| p.to_path_buf()).ok()
}

/// Case-insensitive comparison of two path strings, matching Windows semantics.
pub fn eq_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}
