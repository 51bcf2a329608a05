//! Path utilities for comic discovery and sidecar handling.
//!
//! This module holds the filename rules shared by the scanner, the selector and
//! the sidecar settings store: extension matching, sidecar directory naming,
//! lossy UTF-8 conversion, canonicalization and the two-group scan ordering.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Extensions of the recognized comic containers, lowercase.
pub const COMIC_EXTENSIONS: [&str; 2] = ["cbz", "cbr"];

/// Suffix of the per-document companion directory, lowercase.
pub const SIDECAR_SUFFIX: &str = ".sdr";

/// Gets the file name from a path with fallback to lossy conversion.
///
/// # Arguments
///
/// * `path` - The path to extract the file name from
///
/// # Returns
///
/// * `String` - The file name, using lossy conversion if necessary
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Checks whether a file name ends in one of the comic container extensions.
///
/// The match is case-insensitive and only considers the final extension, so
/// `a.CBZ` and even a bare `.cbz` match while `a.cbz.bak` does not.
pub fn is_comic_file_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    COMIC_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Checks whether a directory name marks a sidecar directory (`*.sdr`, any case).
pub fn is_sidecar_dir_name(name: &str) -> bool {
    name.to_lowercase().ends_with(SIDECAR_SUFFIX)
}

/// Returns the sidecar directory that belongs to a document.
///
/// `books/issue 1.cbz` maps to `books/issue 1.sdr`.
pub fn sidecar_dir_for(document: &Path) -> Result<PathBuf> {
    let stem = document
        .file_stem()
        .ok_or_else(|| Error::InvalidPath(document.to_path_buf(), "No file name".to_string()))?;
    let mut name = stem.to_os_string();
    name.push(SIDECAR_SUFFIX);
    Ok(match document.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    })
}

/// Resolves a path to its canonical real path.
///
/// Falls back to the given path when canonicalization fails, e.g. when the file
/// vanished after the scan. The caller then fails on open like for any other
/// unreadable document.
pub async fn resolve_real_path(path: &Path) -> PathBuf {
    match tokio::fs::canonicalize(path).await {
        Ok(real) => real,
        Err(e) => {
            log::debug!("Cannot canonicalize {:?}: {}", path, e);
            path.to_path_buf()
        }
    }
}

/// Sorts scan results into the two display groups.
///
/// Files directly inside `root` come first, files from subdirectories second.
/// Inside each group, entries are ordered by filename, case-insensitively, with
/// the full path as a tie breaker so the result is deterministic.
pub fn sort_scan_groups(root: &Path, files: &mut [PathBuf]) {
    files.par_sort_by_cached_key(|path| {
        let in_subdirectory = path.parent() != Some(root);
        (
            in_subdirectory,
            get_file_name_lossy(path).to_lowercase(),
            path_to_string_lossy(path),
        )
    });
}

/// Text shown for a scanned file in the selector.
///
/// Non-recursive scans show the bare file name, recursive scans the path
/// relative to the scan root.
pub fn display_name(root: &Path, path: &Path, recursive: bool) -> String {
    if !recursive {
        return get_file_name_lossy(path);
    }
    match path.strip_prefix(root) {
        Ok(relative) => path_to_string_lossy(relative),
        Err(_) => path_to_string_lossy(path),
    }
}
