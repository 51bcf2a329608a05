use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::mapper::MetadataMapper;
use crate::parser::{ComicParser, comic_info::ComicInfoParser};
use crate::path_utils::resolve_real_path;
use crate::runner::BatchRunner;
use crate::scanner::Scanner;
use crate::selector::{Selection, Selector};
use crate::store::{SettingsStore, sidecar::SidecarStore};
use crate::types::{ExtractionOptions, RunOutcome, ScanResult};

/// The main comicmeta extraction context, built declaratively using the builder pattern.
///
/// This struct is handed explicitly to every entry point and carries the scan
/// root, the user's choices and the parser/store collaborators:
///
/// - [`extract_from_folder`](ComicMetaConfig::extract_from_folder): scan the root and run a batch
/// - [`extract_from_selection`](ComicMetaConfig::extract_from_selection): scan, let the user pick, run a batch
/// - [`extract_document`](ComicMetaConfig::extract_document): one document, no prompts
/// - [`restore_document`](ComicMetaConfig::restore_document): undo extraction for one document
///
/// ## Builder Pattern
///
/// ```rust,no_run
/// # use comicmeta::prelude::*;
/// let config = ComicMetaConfig::builder()
///     .root(PathBuf::from("./comics"))
///     .recursive(true)
///     .extract_toc(false)
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct ComicMetaConfig {
    /// Directory to scan for comic files.
    pub root: PathBuf,

    /// Whether to include subfolders.
    ///
    /// `None` asks the host, but only when the root actually has subfolders.
    #[builder(default)]
    pub recursive: Option<bool>,

    /// Whether to derive a handmade ToC from page bookmarks.
    #[builder(default = "true")]
    pub extract_toc: bool,

    /// Reader for the embedded metadata. Defaults to [`ComicInfoParser`].
    #[builder(setter(custom), default = "Arc::new(ComicInfoParser::new())")]
    pub parser: Arc<dyn ComicParser>,

    /// Per-document settings persistence. Defaults to [`SidecarStore`].
    #[builder(setter(custom), default = "Arc::new(SidecarStore::new())")]
    pub store: Arc<dyn SettingsStore>,
}

impl std::fmt::Debug for ComicMetaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComicMetaConfig")
            .field("root", &self.root)
            .field("recursive", &self.recursive)
            .field("extract_toc", &self.extract_toc)
            .finish_non_exhaustive()
    }
}

impl ComicMetaConfig {
    /// Creates a new builder for configuring `ComicMetaConfig`.
    pub fn builder() -> ComicMetaConfigBuilder {
        ComicMetaConfigBuilder::default()
    }

    /// Current user choices, for persisting.
    pub fn options(&self) -> ExtractionOptions {
        ExtractionOptions {
            recursive: self.recursive,
            extract_toc: self.extract_toc,
        }
    }

    /// Checks that the root exists and is a directory.
    pub fn preflight_check(&self) -> Result<&Self> {
        if !self.root.exists() {
            return Err(Error::NotFound(format!(
                "Root path does not exist: {:?}",
                self.root
            )));
        }
        if !self.root.is_dir() {
            return Err(Error::InvalidPath(
                self.root.clone(),
                "Root path is not a directory.".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::new(self.root.clone())
    }

    pub fn mapper(&self) -> MetadataMapper {
        MetadataMapper::new(Arc::clone(&self.parser), Arc::clone(&self.store))
    }

    pub fn runner(&self) -> BatchRunner {
        BatchRunner::new(self.mapper(), self.extract_toc)
    }

    /// Decides whether the scan descends into subfolders.
    async fn resolve_recursion(&self, scanner: &Scanner, host: &dyn Host) -> bool {
        match self.recursive {
            Some(recursive) => recursive,
            None if scanner.has_subdirectories().await => {
                host.confirm(
                    "Also extract metadata from comics in subfolders?",
                    "Include subfolders",
                    "This folder only",
                )
                .await
            }
            None => false,
        }
    }

    /// Scans the root, asking about subfolders when needed.
    pub async fn scan(&self, host: &dyn Host) -> Result<ScanResult> {
        self.preflight_check()?;
        let scanner = self.scanner();
        let recursive = self.resolve_recursion(&scanner, host).await;
        let files = scanner.scan(recursive).await;
        log::info!("Found {} comic files under {:?}", files.len(), self.root);
        Ok(ScanResult::new(&self.root, recursive, files))
    }

    /// Extracts metadata from every comic under the root.
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome::NoFiles)` - Nothing was found; the host was told so
    /// * `Ok(outcome)` - The batch result
    /// * `Err(Error)` - The root is missing or not a directory
    pub async fn extract_from_folder(
        &self,
        host: &dyn Host,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let scan = self.scan(host).await?;
        if scan.is_empty() {
            host.message("No comic files found").await;
            return Ok(RunOutcome::NoFiles);
        }
        Ok(self.runner().run(&scan.files, host, cancel).await)
    }

    /// Lets the user pick comics under the root, then extracts the chosen ones.
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome::NoFiles)` - Nothing was found or nothing was selected
    /// * `Ok(RunOutcome::Cancelled)` - The checklist was dismissed
    /// * `Ok(outcome)` - The batch result
    pub async fn extract_from_selection(
        &self,
        host: &dyn Host,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let scan = self.scan(host).await?;
        if scan.is_empty() {
            host.message("No comic files found").await;
            return Ok(RunOutcome::NoFiles);
        }

        match Selector::new(scan).select(host).await {
            Selection::Files(files) => Ok(self.runner().run(&files, host, cancel).await),
            Selection::NoneSelected => {
                host.message("No file selected").await;
                Ok(RunOutcome::NoFiles)
            }
            Selection::Dismissed => Ok(RunOutcome::Cancelled),
        }
    }

    /// Extracts metadata from a single document without prompting.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Properties were merged and the host notified
    /// * `Ok(false)` - The document was skipped; the reason is logged
    pub async fn extract_document(&self, path: &Path, host: &dyn Host) -> Result<bool> {
        let real_path = resolve_real_path(path).await;
        match self.runner().process_isolated(real_path.clone()).await {
            Ok(()) => {
                BatchRunner::announce(host, &real_path).await;
                Ok(true)
            }
            Err(e) => {
                log::warn!("Skipping {:?}: {}", real_path, e);
                Ok(false)
            }
        }
    }

    /// Puts a document's original properties back.
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - The document was never extracted into
    pub async fn restore_document(&self, path: &Path, host: &dyn Host) -> Result<bool> {
        let real_path = resolve_real_path(path).await;
        let mapper = self.mapper();
        let target = real_path.clone();
        let restored = spawn_blocking(move || mapper.restore(&target)).await??;
        if restored {
            BatchRunner::announce(host, &real_path).await;
        }
        Ok(restored)
    }
}

impl ComicMetaConfigBuilder {
    /// Sets the metadata reader.
    pub fn parser(&mut self, parser: impl ComicParser + 'static) -> &mut Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Sets the settings store.
    pub fn store(&mut self, store: impl SettingsStore + 'static) -> &mut Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Applies persisted user choices.
    pub fn options(&mut self, options: ExtractionOptions) -> &mut Self {
        self.recursive = Some(options.recursive);
        self.extract_toc = Some(options.extract_toc);
        self
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(root) = &self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path must not be empty".to_string());
            }
        }
        Ok(())
    }
}
