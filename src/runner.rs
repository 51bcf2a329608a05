//! Batch extraction driver.
//!
//! The runner walks an ordered list of documents one at a time. Each document is
//! extracted, merged and flushed on a blocking worker task; a panic there comes
//! back as a `JoinError` and is counted as a failure for that document only.
//! Cancellation is checked between documents, never inside one.

use std::path::{Path, PathBuf};

use tokio::task::spawn_blocking;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::host::{Host, Notification};
use crate::mapper::MetadataMapper;
use crate::path_utils::{get_file_name_lossy, resolve_real_path};
use crate::toc::TocBuilder;
use crate::types::{BatchOutcome, RunOutcome};

/// Extracts, merges and optionally writes the ToC of a single document.
///
/// The property merge decides success. A failing ToC write is logged and does
/// not undo the already flushed properties.
pub fn process_document(mapper: &MetadataMapper, path: &Path, extract_toc: bool) -> Result<()> {
    let record = mapper.extract(path)?;
    let mut settings = mapper.merge_record(path, &record)?;

    if extract_toc {
        let toc = TocBuilder::build(&record.pages);
        let written = TocBuilder::write(&mut settings, &toc)
            .and_then(|written| {
                if written {
                    mapper.store().flush(&settings)?;
                }
                Ok(written)
            });
        match written {
            Ok(true) => log::debug!("Wrote {} ToC entries for {:?}", toc.len(), path),
            Ok(false) => log::debug!("No bookmarks in {:?}, ToC left untouched", path),
            Err(e) => log::warn!("Cannot write ToC for {:?}: {}", path, e),
        }
    }
    Ok(())
}

/// Drives a list of documents through the metadata mapper.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    mapper: MetadataMapper,
    extract_toc: bool,
}

impl BatchRunner {
    pub fn new(mapper: MetadataMapper, extract_toc: bool) -> Self {
        Self {
            mapper,
            extract_toc,
        }
    }

    /// Processes one document in an isolated blocking task.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document's properties were merged
    /// * `Err(Error::Join)` - The worker panicked
    /// * `Err(_)` - The document was skipped for the given reason
    pub async fn process_isolated(&self, path: PathBuf) -> Result<()> {
        let mapper = self.mapper.clone();
        let extract_toc = self.extract_toc;
        spawn_blocking(move || process_document(&mapper, &path, extract_toc)).await?
    }

    /// Emits the two change notifications for a merged document.
    pub async fn announce(host: &dyn Host, path: &Path) {
        host.notify(Notification::DocumentCacheStale(path.to_path_buf()))
            .await;
        host.notify(Notification::BookMetadataChanged).await;
    }

    /// Runs a batch over `paths` in order.
    ///
    /// # Arguments
    ///
    /// * `paths` - Documents to process, in processing order
    /// * `host` - Confirmation, progress and notification surface
    /// * `cancel` - Checked before each document
    ///
    /// # Returns
    ///
    /// * `RunOutcome::Completed` - All documents were attempted; the summary was shown
    /// * `RunOutcome::Cancelled` - Declined up front or cancelled between documents;
    ///   no summary is shown
    pub async fn run(
        &self,
        paths: &[PathBuf],
        host: &dyn Host,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let total = paths.len();
        let question = format!("Extract metadata from {} comic files?", total);
        if !host.confirm(&question, "Extract", "Cancel").await {
            log::info!("Batch extraction declined");
            return RunOutcome::Cancelled;
        }

        log::info!("Extracting metadata from {} files", total);
        let mut outcome = BatchOutcome::default();

        for (index, path) in paths.iter().enumerate() {
            let real_path = resolve_real_path(path).await;
            host.progress(
                &format!("Extracting metadata: {}", get_file_name_lossy(&real_path)),
                index + 1,
                total,
            )
            .await;

            if cancel.is_cancelled() {
                log::info!("Batch extraction cancelled after {} of {} files", index, total);
                return RunOutcome::Cancelled;
            }

            outcome.attempted += 1;
            match self.process_isolated(real_path.clone()).await {
                Ok(()) => {
                    outcome.succeeded += 1;
                    Self::announce(host, &real_path).await;
                }
                Err(e) if e.is_fault() => {
                    log::error!("Extraction of {:?} faulted: {}", real_path, e);
                }
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", real_path, e);
                }
            }

            tokio::task::yield_now().await;
        }

        log::info!("{}", outcome.summary());
        host.message(&outcome.summary()).await;
        RunOutcome::Completed(outcome)
    }
}
