//! Host collaborator interface.
//!
//! comicmeta does not draw dialogs or own an event bus. The embedding
//! application implements [`Host`] to answer confirmations, show progress and
//! messages, offer the file checklist and receive change notifications.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::selector::SelectorItem;

/// Broadcasts emitted after a document's metadata changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Cached rendering/metadata for this document is out of date.
    DocumentCacheStale(PathBuf),
    /// Some document's book metadata changed.
    BookMetadataChanged,
}

/// UI and notification surface provided by the embedding application.
#[async_trait]
pub trait Host: Send + Sync {
    /// Asks a yes/no question. `true` means the user picked `ok_label`.
    async fn confirm(&self, message: &str, ok_label: &str, cancel_label: &str) -> bool;

    /// Shows batch progress; `index` is one-based.
    async fn progress(&self, message: &str, index: usize, total: usize);

    /// Shows an informational message.
    async fn message(&self, text: &str);

    async fn notify(&self, notification: Notification);

    /// Offers a multi-select checklist.
    ///
    /// Returns the chosen item indices, or `None` when the checklist was closed
    /// without committing.
    async fn select(&self, items: &[SelectorItem]) -> Option<Vec<usize>> {
        let _ = items;
        None
    }
}

/// Non-interactive host: confirms everything, selects everything and logs the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessHost;

#[async_trait]
impl Host for HeadlessHost {
    async fn confirm(&self, message: &str, ok_label: &str, _cancel_label: &str) -> bool {
        log::info!("{} -> {}", message, ok_label);
        true
    }

    async fn progress(&self, message: &str, index: usize, total: usize) {
        log::info!("[{}/{}] {}", index, total, message);
    }

    async fn message(&self, text: &str) {
        log::info!("{}", text);
    }

    async fn notify(&self, notification: Notification) {
        log::debug!("{:?}", notification);
    }

    async fn select(&self, items: &[SelectorItem]) -> Option<Vec<usize>> {
        Some((0..items.len()).collect())
    }
}
