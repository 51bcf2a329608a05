//! Parser module provides the interface to comic metadata readers.
//!
//! The batch pipeline never decodes containers itself. It asks a [`ComicParser`]
//! for a [`ComicMetadataRecord`] and treats any error as "skip this file".
//! [`comic_info::ComicInfoParser`] is the default implementation for zip-based
//! containers carrying a `ComicInfo.xml` descriptor.

use crate::error::Result;
use crate::types::ComicMetadataRecord;
use std::path::Path;

pub mod comic_info;

/// Common interface for all comic metadata readers.
///
/// Implementations are called from a blocking worker thread, one document at a
/// time, and may panic; the batch runner contains such faults.
pub trait ComicParser: Send + Sync {
    /// Reads the embedded metadata of a comic container.
    ///
    /// # Parameters
    /// * `path` - Path of the comic container
    ///
    /// # Returns
    /// * `Result<ComicMetadataRecord>` - The parsed record, or an error when the
    ///   container cannot be read or carries no metadata
    fn open(&self, path: &Path) -> Result<ComicMetadataRecord>;
}

impl<F> ComicParser for F
where
    F: Fn(&Path) -> Result<ComicMetadataRecord> + Send + Sync,
{
    fn open(&self, path: &Path) -> Result<ComicMetadataRecord> {
        self(path)
    }
}
