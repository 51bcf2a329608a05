//! Comic file discovery module.
//!
//! This module walks a directory tree and collects the comic containers found in
//! it. Sidecar directories (`*.sdr`) hold per-document reader state and are never
//! treated as comic content nor descended into. Unreadable directories and
//! entries that are neither files nor directories are skipped silently.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use tokio::fs::{ReadDir, read_dir};

use crate::path_utils::{get_file_name_lossy, is_comic_file_name, is_sidecar_dir_name};

/// Kind of a directory entry after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
    Other,
}

/// Enumerates comic files below a root directory.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    /// Creates a new Scanner for the specified directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collects the comic files under the root.
    ///
    /// # Arguments
    ///
    /// * `recursive` - Whether to descend into non-sidecar subdirectories
    ///
    /// # Returns
    ///
    /// * `Vec<PathBuf>` - Matching files, unsorted. An unreadable root yields an
    ///   empty list.
    pub async fn scan(&self, recursive: bool) -> Vec<PathBuf> {
        let mut visited = HashSet::new();
        let mut found = Vec::new();
        Self::scan_dir(&self.root, recursive, &mut visited, &mut found).await;
        found
    }

    /// Checks whether the root has at least one immediate non-sidecar subdirectory.
    pub async fn has_subdirectories(&self) -> bool {
        let mut entries: ReadDir = match read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("Cannot read directory {:?}: {}", self.root, e);
                return false;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if Self::entry_kind(&path).await == EntryKind::Directory
                && !is_sidecar_dir_name(&get_file_name_lossy(&path))
            {
                return true;
            }
        }
        false
    }

    /// Scans one directory, appending matches to `found`.
    ///
    /// `read_dir` never yields the `.`/`..` pseudo-entries, so there is nothing to
    /// filter for them here. `visited` holds canonical directory paths and stops
    /// symlink cycles.
    fn scan_dir<'a>(
        directory: &'a Path,
        recursive: bool,
        visited: &'a mut HashSet<PathBuf>,
        found: &'a mut Vec<PathBuf>,
    ) -> BoxFuture<'a, ()> {
        async move {
            let canonical = tokio::fs::canonicalize(directory)
                .await
                .unwrap_or_else(|_| directory.to_path_buf());
            if !visited.insert(canonical) {
                return;
            }

            let mut entries: ReadDir = match read_dir(directory).await {
                Ok(entries) => entries,
                Err(e) => {
                    log::debug!("Skipping unreadable directory {:?}: {}", directory, e);
                    return;
                }
            };

            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        log::debug!("Stopped reading directory {:?}: {}", directory, e);
                        break;
                    }
                };
                let path = entry.path();
                let name = get_file_name_lossy(&path);

                match Self::entry_kind(&path).await {
                    EntryKind::Directory => {
                        if is_sidecar_dir_name(&name) || !recursive {
                            continue;
                        }
                        Self::scan_dir(&path, recursive, visited, found).await;
                    }
                    EntryKind::File => {
                        if is_comic_file_name(&name) {
                            found.push(path);
                        }
                    }
                    EntryKind::Other => {}
                }
            }
        }
        .boxed()
    }

    /// Resolves the entry type, following symlinks. Dangling links are `Other`.
    async fn entry_kind(path: &Path) -> EntryKind {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => EntryKind::Directory,
            Ok(meta) if meta.is_file() => EntryKind::File,
            _ => EntryKind::Other,
        }
    }
}
