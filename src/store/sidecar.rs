use crate::error::Result;
use crate::path_utils::sidecar_dir_for;
use crate::store::{CustomMetadata, DocSettings, SettingsStore, store_error};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const CUSTOM_METADATA_FILE: &str = "custom_metadata.json";
const SETTINGS_FILE: &str = "metadata.json";

/// On-disk layout of `custom_metadata.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CustomMetadataFile {
    #[serde(flatten)]
    metadata: CustomMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// A settings store keeping JSON files in each document's sidecar directory.
///
/// For `books/issue 1.cbz` the files are `books/issue 1.sdr/custom_metadata.json`
/// and `books/issue 1.sdr/metadata.json`. Writes go to a temporary file that is
/// renamed over the target, so an interrupted flush leaves the old file intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn new() -> Self {
        Self
    }

    pub fn custom_metadata_path(document: &Path) -> Result<PathBuf> {
        Ok(sidecar_dir_for(document)?.join(CUSTOM_METADATA_FILE))
    }

    pub fn settings_path(document: &Path) -> Result<PathBuf> {
        Ok(sidecar_dir_for(document)?.join(SETTINGS_FILE))
    }

    /// Reads a JSON file, treating a missing file as `None`.
    fn read_json<T: for<'de> Deserialize<'de>>(document: &Path, file: &Path) -> Result<Option<T>> {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error(document, format!("{:?}: {}", file, e))),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| store_error(document, format!("{:?} is corrupt: {}", file, e)))
    }

    /// Writes `value` to `file` through a sibling temporary file.
    fn write_json<T: Serialize>(document: &Path, file: &Path, value: &T) -> Result<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_vec_pretty(value)?;
            let tmp = file.with_extension("json.tmp");
            let mut out = fs::File::create(&tmp)?;
            out.write_all(&json)?;
            out.sync_all()?;
            fs::rename(&tmp, file)
        };
        write().map_err(|e| store_error(document, format!("Cannot write {:?}: {}", file, e)))
    }
}

impl SettingsStore for SidecarStore {
    fn open(&self, document: &Path) -> Result<DocSettings> {
        let metadata: CustomMetadataFile =
            Self::read_json(document, &Self::custom_metadata_path(document)?)?.unwrap_or_default();
        let settings: Map<String, Value> =
            Self::read_json(document, &Self::settings_path(document)?)?.unwrap_or_default();

        Ok(DocSettings::with_contents(
            document,
            metadata.metadata,
            settings,
        ))
    }

    fn flush_custom_metadata(&self, settings: &DocSettings) -> Result<()> {
        let document = settings.document();
        let file = CustomMetadataFile {
            metadata: settings.custom_metadata().clone(),
            updated_at: Some(Utc::now()),
        };
        Self::write_json(document, &Self::custom_metadata_path(document)?, &file)
    }

    fn flush(&self, settings: &DocSettings) -> Result<()> {
        let document = settings.document();
        Self::write_json(
            document,
            &Self::settings_path(document)?,
            settings.settings(),
        )
    }
}
