//! comicmeta - Comic Metadata Extraction Library
//!
//! This crate scans a directory tree for comic archives (CBZ/CBR), reads their
//! embedded `ComicInfo.xml` metadata and merges it into a reader's per-document
//! sidecar settings. The first merge into a document keeps a backup of the values
//! it replaces, so extraction can always be undone. Page bookmarks can be turned
//! into a handmade table of contents.
//!
//! Batches run one document at a time. Each document is processed on an
//! isolated worker task, so a corrupt archive is counted as a failure instead of
//! aborting the run, and cancellation takes effect between documents.
//!
//! # Getting Started
//!
//! ```rust,no_run
//! use comicmeta::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> comicmeta::error::Result<()> {
//!     let config = ComicMetaConfig::builder()
//!         .root(PathBuf::from("./comics"))
//!         .recursive(true)
//!         .build()?;
//!
//!     let cancel = CancellationToken::new();
//!     match config.extract_from_folder(&HeadlessHost, &cancel).await? {
//!         RunOutcome::Completed(outcome) => println!("{}", outcome.summary()),
//!         RunOutcome::Cancelled => println!("Cancelled"),
//!         RunOutcome::NoFiles => println!("Nothing to do"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Embedding applications implement [`host::Host`] for dialogs, progress and
//! notifications, and may swap the [`parser::ComicParser`] or
//! [`store::SettingsStore`] implementations through the builder.

pub mod comicmeta;
pub mod error;
pub mod host;
pub mod mapper;
pub mod parser;
pub mod path_utils;
pub mod runner;
pub mod scanner;
pub mod selector;
pub mod store;
pub mod text;
pub mod toc;
pub mod types;

// Publicly expose the main `ComicMetaConfig` struct and its builder
pub use comicmeta::ComicMetaConfig;
pub use comicmeta::ComicMetaConfigBuilder;

// Re-export core types for direct access
pub use types::{
    BatchOutcome, ComicMetadataRecord, ExtractionOptions, PageInfo, PropertyKey, RunOutcome,
    ScanResult, TocEntry,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and traits, allowing you to
/// import everything you need with a single `use comicmeta::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        BatchOutcome, ComicMetaConfig, ComicMetaConfigBuilder, ComicMetadataRecord,
        ExtractionOptions, PageInfo, PropertyKey, RunOutcome, ScanResult, TocEntry, error, types,
    };
    pub use crate::host::{HeadlessHost, Host, Notification};
    pub use crate::mapper::MetadataMapper;
    pub use crate::parser::{ComicParser, comic_info::ComicInfoParser};
    pub use crate::runner::BatchRunner;
    pub use crate::scanner::Scanner;
    pub use crate::selector::{Selection, Selector, SelectorItem};
    pub use crate::store::{DocSettings, SettingsStore, sidecar::SidecarStore};
    pub use crate::toc::TocBuilder;
    pub use std::path::{Path, PathBuf};
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
}
