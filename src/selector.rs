//! Manual file selection over scan results.
//!
//! The selector turns a [`ScanResult`] into checklist items, hands them to the
//! host and maps the chosen indices back to paths. The chosen subset always
//! keeps scan order, whatever order the host reports the indices in.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::host::Host;
use crate::path_utils::display_name;
use crate::types::ScanResult;

/// One row of the selection checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorItem {
    pub path: PathBuf,
    /// File name for flat scans, root-relative path for recursive ones.
    pub text: String,
}

/// Result of a selection round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Files(Vec<PathBuf>),
    /// The user committed an empty selection.
    NoneSelected,
    /// The checklist was closed without committing.
    Dismissed,
}

#[derive(Debug, Clone)]
pub struct Selector {
    scan: ScanResult,
}

impl Selector {
    pub fn new(scan: ScanResult) -> Self {
        Self { scan }
    }

    /// Builds a selector from unsorted scanner output.
    pub fn from_paths(root: &Path, recursive: bool, paths: Vec<PathBuf>) -> Self {
        Self::new(ScanResult::new(root, recursive, paths))
    }

    pub fn scan(&self) -> &ScanResult {
        &self.scan
    }

    /// Checklist rows in scan order.
    pub fn items(&self) -> Vec<SelectorItem> {
        self.scan
            .files
            .iter()
            .map(|path| SelectorItem {
                path: path.clone(),
                text: display_name(&self.scan.root, path, self.scan.recursive),
            })
            .collect()
    }

    /// Maps chosen indices back to paths.
    ///
    /// Duplicates and out-of-range indices are ignored.
    pub fn resolve(&self, chosen: &[usize]) -> Selection {
        let chosen: BTreeSet<usize> = chosen
            .iter()
            .copied()
            .filter(|&i| i < self.scan.files.len())
            .collect();
        if chosen.is_empty() {
            return Selection::NoneSelected;
        }
        Selection::Files(
            chosen
                .into_iter()
                .map(|i| self.scan.files[i].clone())
                .collect(),
        )
    }

    /// Presents the checklist through the host.
    pub async fn select(&self, host: &dyn Host) -> Selection {
        match host.select(&self.items()).await {
            Some(chosen) => self.resolve(&chosen),
            None => Selection::Dismissed,
        }
    }
}
