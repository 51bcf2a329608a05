//! Core data types for the comicmeta extraction library.
//!
//! This module defines the fundamental data structures used throughout comicmeta:
//! - The parsed source record (`ComicMetadataRecord`, `PageInfo`)
//! - The target property schema (`PropertyKey`) and its translation table
//! - Table-of-contents entries (`TocEntry`)
//! - Scan and batch results (`ScanResult`, `BatchOutcome`, `RunOutcome`)
//! - User-facing options (`ExtractionOptions`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::path_utils::sort_scan_groups;

/// A document property written by the metadata mapper.
///
/// This is the closed set of keys the mapper ever touches. Source fields that do
/// not translate to one of these are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Title,
    Authors,
    Series,
    SeriesIndex,
    Description,
    Keywords,
    Language,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 7] = [
        PropertyKey::Title,
        PropertyKey::Authors,
        PropertyKey::Series,
        PropertyKey::SeriesIndex,
        PropertyKey::Description,
        PropertyKey::Keywords,
        PropertyKey::Language,
    ];

    /// Name of the property in the settings store.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKey::Title => "title",
            PropertyKey::Authors => "authors",
            PropertyKey::Series => "series",
            PropertyKey::SeriesIndex => "series_index",
            PropertyKey::Description => "description",
            PropertyKey::Keywords => "keywords",
            PropertyKey::Language => "language",
        }
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ComicInfo.xml element name -> document property.
pub const FIELD_TRANSLATION: [(&str, PropertyKey); 7] = [
    ("Title", PropertyKey::Title),
    ("Writer", PropertyKey::Authors),
    ("Series", PropertyKey::Series),
    ("Number", PropertyKey::SeriesIndex),
    ("Summary", PropertyKey::Description),
    ("Tags", PropertyKey::Keywords),
    ("LanguageISO", PropertyKey::Language),
];

/// Looks up the document property for a source-schema field name.
///
/// Returns `None` for any field outside the translation table.
pub fn translate_field(source_name: &str) -> Option<PropertyKey> {
    FIELD_TRANSLATION
        .iter()
        .find(|(name, _)| *name == source_name)
        .map(|(_, key)| *key)
}

/// One `<Page>` entry of a ComicInfo.xml descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Zero-based image index, kept as the raw attribute text.
    pub image: String,
    /// Bookmark label, if the page carries one.
    pub bookmark: Option<String>,
}

impl PageInfo {
    pub fn new(image: impl Into<String>, bookmark: impl Into<String>) -> Self {
        let bookmark = bookmark.into();
        Self {
            image: image.into(),
            bookmark: if bookmark.is_empty() {
                None
            } else {
                Some(bookmark)
            },
        }
    }
}

/// Metadata parsed out of a comic container.
///
/// `fields` is keyed by the source-schema element name (`Title`, `Writer`, ...)
/// and holds the raw text as found in the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComicMetadataRecord {
    pub fields: BTreeMap<String, String>,
    pub pages: Vec<PageInfo>,
}

impl ComicMetadataRecord {
    /// Raw value of a source-schema field.
    pub fn get(&self, source_name: &str) -> Option<&str> {
        self.fields.get(source_name).map(String::as_str)
    }

    /// Builder-style setter, handy for parsers and tests.
    pub fn with_field(mut self, source_name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(source_name.into(), value.into());
        self
    }

    pub fn with_pages(mut self, pages: Vec<PageInfo>) -> Self {
        self.pages = pages;
        self
    }

    /// True when the record carries neither fields nor pages.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.pages.is_empty()
    }
}

/// A single entry of a handmade table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub depth: u32,
    /// One-based page number.
    pub page: u32,
    pub title: String,
}

/// Ordered comic files found under a scan root.
///
/// Files directly inside `root` come first, then files from subdirectories. Each
/// group is sorted by filename, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub root: PathBuf,
    pub recursive: bool,
    pub files: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new(root: &Path, recursive: bool, mut files: Vec<PathBuf>) -> Self {
        sort_scan_groups(root, &mut files);
        Self {
            root: root.to_path_buf(),
            recursive,
            files,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Success counters accumulated over one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub succeeded: usize,
}

impl BatchOutcome {
    /// Human-readable summary shown once a run completes.
    pub fn summary(&self) -> String {
        format!(
            "Metadata extracted from {} / {} files",
            self.succeeded, self.attempted
        )
    }
}

/// Terminal state of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(BatchOutcome),
    /// Declined at confirmation or cancelled mid-run. Partial counts are dropped.
    Cancelled,
    /// No file was found or selected, so no run took place.
    NoFiles,
}

/// User choices a host can persist between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// `None` asks the host whenever the root has subfolders.
    pub recursive: Option<bool>,
    pub extract_toc: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            recursive: None,
            extract_toc: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_covers_every_property() {
        for key in PropertyKey::ALL {
            assert!(FIELD_TRANSLATION.iter().any(|(_, k)| *k == key), "{key} unmapped");
        }
        assert_eq!(translate_field("Writer"), Some(PropertyKey::Authors));
        assert_eq!(translate_field("LanguageISO"), Some(PropertyKey::Language));
        assert_eq!(translate_field("Penciller"), None);
        assert_eq!(translate_field("title"), None);
    }

    #[test]
    fn test_batch_outcome_summary() {
        let outcome = BatchOutcome {
            attempted: 3,
            succeeded: 2,
        };
        assert_eq!(outcome.summary(), "Metadata extracted from 2 / 3 files");
    }
}
