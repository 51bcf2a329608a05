//! Store module provides the per-document settings interface.
//!
//! Every document owns two namespaces of properties: the live *custom* values a
//! reader displays, and the *original* values recorded the first time extraction
//! overwrote them. General reader settings (such as the handmade table of
//! contents) live next to them. [`sidecar::SidecarStore`] keeps all of it in the
//! document's `.sdr` companion directory.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod sidecar;

/// Property namespaces of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomMetadata {
    /// Values before extraction first touched the document.
    #[serde(rename = "doc_props", default)]
    pub original: BTreeMap<String, String>,
    /// Live values.
    #[serde(rename = "custom_props", default)]
    pub custom: BTreeMap<String, String>,
}

/// An opened settings handle for a single document.
///
/// Changes stay in memory until the store flushes them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocSettings {
    document: PathBuf,
    metadata: CustomMetadata,
    settings: Map<String, Value>,
}

impl DocSettings {
    pub fn new(document: impl Into<PathBuf>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    pub fn with_contents(
        document: impl Into<PathBuf>,
        metadata: CustomMetadata,
        settings: Map<String, Value>,
    ) -> Self {
        Self {
            document: document.into(),
            metadata,
            settings,
        }
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    pub fn custom_metadata(&self) -> &CustomMetadata {
        &self.metadata
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Current custom value of a property.
    pub fn read_custom(&self, key: &str) -> Option<&str> {
        self.metadata.custom.get(key).map(String::as_str)
    }

    pub fn save_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.custom.insert(key.into(), value.into());
    }

    pub fn remove_custom(&mut self, key: &str) -> Option<String> {
        self.metadata.custom.remove(key)
    }

    pub fn original(&self) -> &BTreeMap<String, String> {
        &self.metadata.original
    }

    /// True once any original value was recorded for this document.
    pub fn has_original_snapshot(&self) -> bool {
        !self.metadata.original.is_empty()
    }

    /// Records `value` as the original of `key` unless one is already recorded.
    ///
    /// # Returns
    ///
    /// * `true` - The value was recorded
    /// * `false` - `key` already had an original, which is kept
    pub fn snapshot_original(&mut self, key: &str, value: &str) -> bool {
        if self.metadata.original.contains_key(key) {
            return false;
        }
        self.metadata
            .original
            .insert(key.to_string(), value.to_string());
        true
    }

    /// Removes and returns the original snapshot.
    pub fn take_original(&mut self) -> BTreeMap<String, String> {
        std::mem::take(&mut self.metadata.original)
    }

    pub fn read_setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn save_setting<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        self.settings.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn delete_setting(&mut self, key: &str) -> Option<Value> {
        self.settings.remove(key)
    }
}

/// Common interface for per-document settings persistence.
///
/// Implementations are called from a blocking worker thread. A document is never
/// opened by two callers at the same time during a batch run.
pub trait SettingsStore: Send + Sync {
    /// Opens (or creates empty) settings for a document.
    ///
    /// # Returns
    /// * `Err(Error::Store)` - The existing settings are unreadable or corrupt
    fn open(&self, document: &Path) -> Result<DocSettings>;

    /// Persists both property namespaces.
    fn flush_custom_metadata(&self, settings: &DocSettings) -> Result<()>;

    /// Persists general settings.
    fn flush(&self, settings: &DocSettings) -> Result<()>;
}

/// Wraps a failure of `document`'s store into [`Error::Store`].
pub(crate) fn store_error(document: &Path, reason: impl std::fmt::Display) -> Error {
    Error::Store(document.to_path_buf(), reason.to_string())
}
