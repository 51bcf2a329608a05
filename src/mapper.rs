//! Metadata reconciliation module.
//!
//! This module maps a parsed [`ComicMetadataRecord`] onto the document property
//! schema and merges the result into a document's settings. Merging is a plain
//! overwrite of the custom values, preceded by a per-key backup: the first
//! merge that writes a key copies that key's current value into the *original*
//! namespace, and later merges leave the recorded value alone until
//! [`MetadataMapper::restore`] puts it back.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::ComicParser;
use crate::store::{DocSettings, SettingsStore};
use crate::text::{decode_html_entities, normalize_keywords};
use crate::types::{ComicMetadataRecord, PropertyKey, translate_field};

/// Normalized property values ready to be written.
pub type PropertyMap = BTreeMap<PropertyKey, String>;

/// Extracts comic metadata and merges it into the settings store.
#[derive(Clone)]
pub struct MetadataMapper {
    parser: Arc<dyn ComicParser>,
    store: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for MetadataMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataMapper").finish_non_exhaustive()
    }
}

impl MetadataMapper {
    pub fn new(parser: Arc<dyn ComicParser>, store: Arc<dyn SettingsStore>) -> Self {
        Self { parser, store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Translates and normalizes the fields of a record.
    ///
    /// Source fields outside the translation table are ignored. Every value is
    /// entity-decoded; `Tags` is additionally split on commas and rejoined with
    /// newlines.
    pub fn map_record(record: &ComicMetadataRecord) -> PropertyMap {
        record
            .fields
            .iter()
            .filter_map(|(name, raw)| {
                let key = translate_field(name)?;
                let value = match key {
                    PropertyKey::Keywords => normalize_keywords(raw),
                    _ => decode_html_entities(raw),
                };
                Some((key, value))
            })
            .collect()
    }

    /// Merges mapped properties into opened settings.
    ///
    /// Every key about to be written that has no original yet gets its current
    /// custom value (empty when absent) recorded first. Originals recorded by
    /// earlier merges are never replaced. Custom values are then overwritten.
    pub fn merge(settings: &mut DocSettings, properties: &PropertyMap) {
        for key in properties.keys() {
            let current = settings.read_custom(key.as_str()).unwrap_or("").to_string();
            settings.snapshot_original(key.as_str(), &current);
        }

        for (key, value) in properties {
            settings.save_custom(key.as_str(), value.as_str());
        }
    }

    /// Reads the embedded metadata of a document.
    pub fn extract(&self, path: &Path) -> Result<ComicMetadataRecord> {
        let record = self.parser.open(path)?;
        if record.is_empty() {
            return Err(Error::MissingMetadata(path.to_path_buf()));
        }
        Ok(record)
    }

    /// Merges an already parsed record into the document's store and flushes the
    /// property namespaces.
    ///
    /// Nothing is persisted unless the flush succeeds, so an error leaves the
    /// stored properties as they were. The opened settings are returned for
    /// follow-up writes.
    pub fn merge_record(&self, path: &Path, record: &ComicMetadataRecord) -> Result<DocSettings> {
        let properties = Self::map_record(record);
        if properties.is_empty() && record.pages.is_empty() {
            return Err(Error::MissingMetadata(path.to_path_buf()));
        }

        let mut settings = self.store.open(path)?;
        Self::merge(&mut settings, &properties);
        self.store.flush_custom_metadata(&settings)?;

        log::debug!("Merged {} properties into {:?}", properties.len(), path);
        Ok(settings)
    }

    /// Extracts metadata from `path` and merges it into the settings store.
    ///
    /// # Returns
    ///
    /// * `true` - The document's properties were updated and flushed
    /// * `false` - The document was skipped (no metadata, unreadable container or
    ///   unusable store); the reason is logged
    pub fn extract_and_merge(&self, path: &Path) -> bool {
        match self
            .extract(path)
            .and_then(|record| self.merge_record(path, &record))
        {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", path, e);
                false
            }
        }
    }

    /// Puts the original snapshot back into the custom properties.
    ///
    /// Keys whose original value was empty are removed from the custom set. The
    /// snapshot is cleared so a later extraction takes a fresh one.
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - There was no snapshot to restore
    pub fn restore(&self, path: &Path) -> Result<bool> {
        let mut settings = self.store.open(path)?;
        if !settings.has_original_snapshot() {
            return Ok(false);
        }

        for (key, value) in settings.take_original() {
            if value.is_empty() {
                settings.remove_custom(&key);
            } else {
                settings.save_custom(key, value);
            }
        }
        self.store.flush_custom_metadata(&settings)?;

        log::info!("Restored original properties of {:?}", path);
        Ok(true)
    }
}
