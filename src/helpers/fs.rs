//! Filesystem helpers for packaging
//!
//! Pattern-based copy and removal. Patterns are matched against the path
//! relative to the source folder, and `*` also matches `/`, so `*.h` selects
//! headers at any depth.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Ensure a file's parent directory exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Copy files under `src` matching `pattern` into `dst`.
///
/// With `keep_path` the relative directory structure is preserved; without
/// it every match lands directly in `dst`. A missing `src` copies nothing.
/// Returns the destination paths written.
pub fn copy_pattern(src: &Path, dst: &Path, pattern: &str, keep_path: bool) -> Result<Vec<PathBuf>> {
    copy_matching(src, dst, pattern, keep_path, None)
}

/// Copy the whole tree under `src` into `dst`, leaving out `exclude` and
/// everything below it.
pub fn copy_tree_except(src: &Path, dst: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    copy_matching(src, dst, "*", true, Some(exclude))
}

fn copy_matching(
    src: &Path,
    dst: &Path,
    pattern: &str,
    keep_path: bool,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("invalid pattern '{}'", pattern))?;
    let mut copied = Vec::new();

    if !src.is_dir() {
        return Ok(copied);
    }

    let walker = WalkDir::new(src)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| exclude != Some(e.path()));

    for entry in walker {
        let entry = entry.with_context(|| format!("cannot walk {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("{} is outside {}", entry.path().display(), src.display()))?;
        if !pattern.matches_path_with(rel, MATCH_OPTIONS) {
            continue;
        }

        let target = if keep_path {
            dst.join(rel)
        } else {
            dst.join(entry.file_name())
        };

        ensure_parent_dir(&target)?;
        std::fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "copy failed: {} -> {}",
                entry.path().display(),
                target.display()
            )
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Remove files directly inside `folder` whose name matches `pattern`.
///
/// Not recursive. A missing folder removes nothing. Returns the paths removed.
pub fn rm_pattern(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern =
        Pattern::new(pattern).with_context(|| format!("invalid pattern '{}'", pattern))?;
    let mut removed = Vec::new();

    if !folder.is_dir() {
        return Ok(removed);
    }

    for entry in std::fs::read_dir(folder)
        .with_context(|| format!("cannot read {}", folder.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if pattern.matches_with(&entry.file_name().to_string_lossy(), MATCH_OPTIONS) {
            std::fs::remove_file(&path)
                .with_context(|| format!("rm failed: {}", path.display()))?;
            removed.push(path);
        }
    }

    Ok(removed)
}

/// Remove a directory tree if it exists. Returns true when something was removed.
pub fn rmdir(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path).with_context(|| format!("rmdir failed: {}", path.display()))?;
    Ok(true)
}
