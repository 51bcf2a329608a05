use crate::error::{Error, Result};
use crate::parser::ComicParser;
use crate::path_utils::path_to_string_lossy;
use crate::types::{ComicMetadataRecord, PageInfo};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Name of the metadata descriptor inside a comic archive.
const COMIC_INFO_NAME: &str = "ComicInfo.xml";

/// Reads `ComicInfo.xml` descriptors out of zip-based comic containers.
///
/// RAR-based `.cbr` files are not zip archives and fail to open; they are
/// skipped by the caller like any other unreadable document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComicInfoParser;

impl ComicInfoParser {
    pub fn new() -> Self {
        Self
    }

    /// Locates the descriptor entry, preferring one at the archive root.
    fn find_descriptor(archive: &ZipArchive<File>) -> Option<String> {
        let mut nested: Option<String> = None;
        for name in archive.file_names() {
            let file_name = name.rsplit('/').next().unwrap_or(name);
            if !file_name.eq_ignore_ascii_case(COMIC_INFO_NAME) {
                continue;
            }
            if !name.contains('/') {
                return Some(name.to_string());
            }
            if nested.is_none() {
                nested = Some(name.to_string());
            }
        }
        nested
    }

    /// Parses descriptor XML into a record.
    ///
    /// Every leaf element under `<ComicInfo>` with non-empty text becomes a field;
    /// `<Pages>` is read into the page list.
    pub fn parse_xml(xml: &str) -> Result<ComicMetadataRecord> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if root.tag_name().name() != "ComicInfo" {
            return Err(Error::Unsupported(format!(
                "Unexpected descriptor root <{}>",
                root.tag_name().name()
            )));
        }

        let mut record = ComicMetadataRecord::default();
        for node in root.children().filter(|n| n.is_element()) {
            let name = node.tag_name().name();
            if name == "Pages" {
                record.pages = node
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "Page")
                    .map(|page| {
                        PageInfo::new(
                            page.attribute("Image").unwrap_or(""),
                            page.attribute("Bookmark").unwrap_or(""),
                        )
                    })
                    .collect();
                continue;
            }
            if node.children().any(|c| c.is_element()) {
                continue;
            }
            let text = node.text().map(str::trim).unwrap_or("");
            if !text.is_empty() {
                record.fields.insert(name.to_string(), text.to_string());
            }
        }
        Ok(record)
    }
}

impl ComicParser for ComicInfoParser {
    fn open(&self, path: &Path) -> Result<ComicMetadataRecord> {
        let file = File::open(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to open comic file '{}': {}",
                    path_to_string_lossy(path),
                    e
                ),
            ))
        })?;
        let mut archive = ZipArchive::new(file)?;

        let descriptor = Self::find_descriptor(&archive)
            .ok_or_else(|| Error::MissingMetadata(path.to_path_buf()))?;

        let mut xml = String::new();
        archive.by_name(&descriptor)?.read_to_string(&mut xml)?;

        let record = Self::parse_xml(&xml)?;
        if record.is_empty() {
            return Err(Error::MissingMetadata(path.to_path_buf()));
        }
        Ok(record)
    }
}
