//! Recursive directory walk producing a deduplicated, stably-ordered list of
//! `FileEntry` (§4.2). Grounded on the import scanner's `WalkDir` usage, but
//! diverging from it on symlink policy: symlinks here are followed, with
//! cycles broken by tracking visited canonical directories.

use crate::model::{ExtensionSet, FileEntry};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct CollectOutcome {
    pub files: Vec<FileEntry>,
    pub diagnostics: Vec<String>,
}

/// Walk `inputs` (each a file or directory) and return every entry whose
/// extension is in `extensions`, deduplicated by canonical path.
///
/// `recursive = false` restricts directory inputs to their immediate children.
pub fn collect(inputs: &[PathBuf], recursive: bool, extensions: &ExtensionSet) -> CollectOutcome {
    let mut files = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut visited_dirs: HashSet<PathBuf> = HashSet::new();

    for input in inputs {
        match std::fs::metadata(input) {
            Err(e) => {
                diagnostics.push(format!("cannot stat {:?}: {}", input, e));
                continue;
            }
            Ok(meta) if meta.is_file() => {
                push_if_new(input, extensions, &mut seen, &mut files, &mut diagnostics);
            }
            Ok(_) => {
                walk_directory(
                    input,
                    recursive,
                    extensions,
                    &mut seen,
                    &mut visited_dirs,
                    &mut files,
                    &mut diagnostics,
                );
            }
        }
    }

    tracing::debug!(
        "collect: {} input(s) → {} files, {} diagnostics",
        inputs.len(),
        files.len(),
        diagnostics.len()
    );

    CollectOutcome { files, diagnostics }
}

fn walk_directory(
    dir: &Path,
    recursive: bool,
    extensions: &ExtensionSet,
    seen: &mut HashSet<PathBuf>,
    visited_dirs: &mut HashSet<PathBuf>,
    files: &mut Vec<FileEntry>,
    diagnostics: &mut Vec<String>,
) {
    if let Ok(canon) = std::fs::canonicalize(dir) {
        if !visited_dirs.insert(canon) {
            return;
        }
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .max_depth(max_depth)
        .sort_by(|a, b| {
            a.file_name()
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.file_name().to_string_lossy().to_lowercase())
        })
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && entry.depth() > 0 {
                match std::fs::canonicalize(entry.path()) {
                    Ok(canon) => visited_dirs.insert(canon),
                    Err(_) => true,
                }
            } else {
                true
            }
        });

    for entry in walker {
        match entry {
            Err(e) => {
                let msg = format!("walk error under {:?}: {}", dir, e);
                tracing::warn!("{}", msg);
                diagnostics.push(msg);
            }
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    continue;
                }
                push_if_new(entry.path(), extensions, seen, files, diagnostics);
            }
        }
    }
}

fn push_if_new(
    path: &Path,
    extensions: &ExtensionSet,
    seen: &mut HashSet<PathBuf>,
    files: &mut Vec<FileEntry>,
    diagnostics: &mut Vec<String>,
) {
    if !extensions.matches(path) {
        return;
    }
    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !seen.insert(key) {
        return;
    }
    match std::fs::metadata(path) {
        Ok(meta) => files.push(FileEntry {
            path: path.to_path_buf(),
            size: meta.len(),
            modified: meta.modified().unwrap_or(std::time::UNIX_EPOCH),
        }),
        Err(e) => diagnostics.push(format!("cannot stat {:?}: {}", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, b"x").unwrap();
        p
    }

    #[test]
    fn test_collect_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let out = collect(&[tmp.path().to_path_buf()], true, &ExtensionSet::all());
        assert!(out.files.is_empty());
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "b.txt");
        let out = collect(
            &[tmp.path().to_path_buf()],
            true,
            &ExtensionSet::from_list(&["jpg"]),
        );
        assert_eq!(out.files.len(), 1);
        assert!(out.files[0].path.ends_with("a.jpg"));
    }

    #[test]
    fn test_collect_non_recursive_excludes_grandchildren() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "top.jpg");
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "nested.jpg");

        let out = collect(
            &[tmp.path().to_path_buf()],
            false,
            &ExtensionSet::from_list(&["jpg"]),
        );
        assert_eq!(out.files.len(), 1);
        assert!(out.files[0].path.ends_with("top.jpg"));
    }

    #[test]
    fn test_collect_recursive_includes_grandchildren() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        touch(&sub, "nested.jpg");

        let out = collect(
            &[tmp.path().to_path_buf()],
            true,
            &ExtensionSet::from_list(&["jpg"]),
        );
        assert_eq!(out.files.len(), 1);
    }

    #[test]
    fn test_collect_case_insensitive_extension() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "Photo.JPG");
        let out = collect(
            &[tmp.path().to_path_buf()],
            true,
            &ExtensionSet::from_list(&["jpg"]),
        );
        assert_eq!(out.files.len(), 1);
    }

    #[test]
    fn test_collect_stable_sorted_order() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "b.jpg");
        touch(tmp.path(), "A.jpg");
        touch(tmp.path(), "c.jpg");
        let out = collect(
            &[tmp.path().to_path_buf()],
            true,
            &ExtensionSet::from_list(&["jpg"]),
        );
        let names: Vec<_> = out
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_lowercase())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_follows_symlinks_and_breaks_cycles() {
        let tmp = tempfile::tempdir().unwrap();
        let real_dir = tmp.path().join("real");
        fs::create_dir(&real_dir).unwrap();
        touch(&real_dir, "photo.jpg");

        let link_dir = tmp.path().join("link");
        std::os::unix::fs::symlink(&real_dir, &link_dir).unwrap();

        // self-referential symlink inside real_dir to force a cycle
        let cycle = real_dir.join("loop");
        std::os::unix::fs::symlink(&real_dir, &cycle).ok();

        let out = collect(
            &[tmp.path().to_path_buf()],
            true,
            &ExtensionSet::from_list(&["jpg"]),
        );
        // photo.jpg is reachable via real/ and link/ but dedups to one entry;
        // the cycle through loop/ must not hang or duplicate further.
        assert_eq!(out.files.len(), 1);
    }
}
