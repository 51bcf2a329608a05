//! Common test utilities for the comicmeta crate.
//!
//! Provides functions for setting up test directories, building CBZ fixtures
//! with a ComicInfo.xml descriptor, and a scripted host that records everything
//! the library asks of it.

use async_trait::async_trait;
use comicmeta::error::{Error, Result};
use comicmeta::host::{Host, Notification};
use comicmeta::parser::{ComicParser, comic_info::ComicInfoParser};
use comicmeta::selector::SelectorItem;
use comicmeta::store::{DocSettings, SettingsStore};
use comicmeta::types::ComicMetadataRecord;
use rand::{Rng, distributions::Alphanumeric};
use std::collections::VecDeque;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";

#[allow(dead_code)]
pub struct TestDirs {
    pub test_dir: PathBuf,
    pub source_dir: PathBuf,
}

/// Creates a fresh, uniquely named test directory with a `source` subdirectory.
///
/// The directory is removed again when the returned [`TestDirs`] is dropped.
#[allow(dead_code)]
pub fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let test_dir = PathBuf::from(TEST_TMP_DIR).join(format!("{}-{}", sub_path, rand_string));
    if test_dir.exists() {
        std::fs::remove_dir_all(&test_dir).unwrap();
    }
    let source_dir = test_dir.join("source");
    std::fs::create_dir_all(&source_dir).unwrap();
    // Canonical paths so they compare equal to what the runner resolves.
    let test_dir = test_dir.canonicalize().unwrap();
    let source_dir = source_dir.canonicalize().unwrap();

    TestDirs {
        test_dir,
        source_dir,
    }
}

/// Removes the shared temporary directory once no test directory is left in it.
///
/// Directories of tests still running keep it alive, so this is safe to call
/// from concurrently running tests.
#[allow(dead_code)]
pub fn cleanup_all_test_dirs() {
    let _ = std::fs::remove_dir(TEST_TMP_DIR);
}

impl Drop for TestDirs {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.test_dir);
        cleanup_all_test_dirs();
    }
}

/// Builds a ComicInfo.xml document from field/value pairs and `(image, bookmark)` pages.
#[allow(dead_code)]
pub fn comic_info_xml(fields: &[(&str, &str)], pages: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<ComicInfo xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n",
    );
    for (name, value) in fields {
        xml.push_str(&format!("  <{0}>{1}</{0}>\n", name, value));
    }
    if !pages.is_empty() {
        xml.push_str("  <Pages>\n");
        for (image, bookmark) in pages {
            if bookmark.is_empty() {
                xml.push_str(&format!("    <Page Image=\"{}\" />\n", image));
            } else {
                xml.push_str(&format!(
                    "    <Page Image=\"{}\" Bookmark=\"{}\" />\n",
                    image, bookmark
                ));
            }
        }
        xml.push_str("  </Pages>\n");
    }
    xml.push_str("</ComicInfo>\n");
    xml
}

/// Writes a CBZ at `path` holding one page and, if given, a ComicInfo.xml.
#[allow(dead_code)]
pub fn create_comic(path: &Path, comic_info: Option<&str>) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    zip.start_file("page_001.jpg", options).unwrap();
    zip.write_all(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
    if let Some(xml) = comic_info {
        zip.start_file("ComicInfo.xml", options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path.to_path_buf()
}

/// Writes a CBZ with a simple descriptor titled `title`.
#[allow(dead_code)]
pub fn create_titled_comic(path: &Path, title: &str) -> PathBuf {
    create_comic(path, Some(&comic_info_xml(&[("Title", title)], &[])))
}

/// Creates an empty file (for extension filter tests).
#[allow(dead_code)]
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}

/// Parser that panics on any file whose file name contains `fault`.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FaultyParser;

impl ComicParser for FaultyParser {
    fn open(&self, path: &Path) -> Result<ComicMetadataRecord> {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string());
        if name.is_some_and(|n| n.contains("fault")) {
            panic!("corrupt archive: {:?}", path);
        }
        ComicInfoParser::new().open(path)
    }
}

/// Store whose `open` always fails.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct BrokenStore;

impl SettingsStore for BrokenStore {
    fn open(&self, document: &Path) -> Result<DocSettings> {
        Err(Error::Store(document.to_path_buf(), "permission denied".to_string()))
    }

    fn flush_custom_metadata(&self, _settings: &DocSettings) -> Result<()> {
        unreachable!("never opened")
    }

    fn flush(&self, _settings: &DocSettings) -> Result<()> {
        unreachable!("never opened")
    }
}

/// Everything a [`MockHost`] was asked to do, in order.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Confirm(String),
    Progress(usize, usize),
    Message(String),
    Notify(Notification),
    Select(Vec<String>),
}

/// Scripted host for driving the batch flows in tests.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MockHost {
    /// Answers handed out to `confirm`, in order. Once drained, every answer is `true`.
    confirm_answers: Mutex<VecDeque<bool>>,
    /// Indices returned from `select`; `None` dismisses the checklist.
    selection: Mutex<Option<Vec<usize>>>,
    /// Cancels the token once progress reaches this one-based index.
    cancel_at: Option<(usize, CancellationToken)>,
    events: Mutex<Vec<HostEvent>>,
}

#[allow(dead_code)]
impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirms(answers: &[bool]) -> Self {
        Self {
            confirm_answers: Mutex::new(answers.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, selection: Option<Vec<usize>>) -> Self {
        self.selection = Mutex::new(selection);
        self
    }

    pub fn cancelling_at(mut self, index: usize, token: CancellationToken) -> Self {
        self.cancel_at = Some((index, token));
        self
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: HostEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Host for MockHost {
    async fn confirm(&self, message: &str, _ok_label: &str, _cancel_label: &str) -> bool {
        self.record(HostEvent::Confirm(message.to_string()));
        self.confirm_answers.lock().unwrap().pop_front().unwrap_or(true)
    }

    async fn progress(&self, _message: &str, index: usize, total: usize) {
        self.record(HostEvent::Progress(index, total));
        if let Some((at, token)) = &self.cancel_at {
            if index >= *at {
                token.cancel();
            }
        }
    }

    async fn message(&self, text: &str) {
        self.record(HostEvent::Message(text.to_string()));
    }

    async fn notify(&self, notification: Notification) {
        self.record(HostEvent::Notify(notification));
    }

    async fn select(&self, items: &[SelectorItem]) -> Option<Vec<usize>> {
        self.record(HostEvent::Select(
            items.iter().map(|item| item.text.clone()).collect(),
        ));
        self.selection.lock().unwrap().clone()
    }
}
