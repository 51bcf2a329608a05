//! Handmade table-of-contents synthesis from page bookmarks.
//!
//! ComicInfo.xml pages carry a zero-based `Image` index and an optional
//! `Bookmark` label. Bookmarked pages become depth-1 ToC entries pointing at the
//! one-based page number. An empty result means "no ToC": nothing is written.

use crate::error::Result;
use crate::store::DocSettings;
use crate::types::{PageInfo, TocEntry};

pub const HANDMADE_TOC_KEY: &str = "handmade_toc";
pub const HANDMADE_TOC_ENABLED_KEY: &str = "handmade_toc_enabled";
pub const HANDMADE_TOC_EDIT_ENABLED_KEY: &str = "handmade_toc_edit_enabled";

/// Builds ToC entries out of page bookmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TocBuilder;

impl TocBuilder {
    /// Converts bookmarked pages into ToC entries, keeping input order.
    ///
    /// Pages without a bookmark are skipped. A page whose image index is not a
    /// non-negative integer is logged and skipped without aborting the build.
    pub fn build(pages: &[PageInfo]) -> Vec<TocEntry> {
        pages
            .iter()
            .filter_map(|page| {
                let title = page.bookmark.as_deref().filter(|b| !b.is_empty())?;
                let index = match page.image.trim().parse::<u32>() {
                    Ok(index) => index,
                    Err(e) => {
                        log::warn!(
                            "Ignoring bookmark {:?}: invalid page index {:?} ({})",
                            title,
                            page.image,
                            e
                        );
                        return None;
                    }
                };
                let Some(page_number) = index.checked_add(1) else {
                    log::warn!("Ignoring bookmark {:?}: page index {} overflows", title, index);
                    return None;
                };
                Some(TocEntry {
                    depth: 1,
                    page: page_number,
                    title: title.to_string(),
                })
            })
            .collect()
    }

    /// Stores a handmade ToC with its companion flags.
    ///
    /// The ToC is enabled and locked against manual editing. All three keys are
    /// written together or not at all; an empty `entries` writes nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The ToC was written into `settings` (flushing is up to the caller)
    /// * `Ok(false)` - `entries` was empty
    pub fn write(settings: &mut DocSettings, entries: &[TocEntry]) -> Result<bool> {
        if entries.is_empty() {
            return Ok(false);
        }
        let toc = serde_json::to_value(entries)?;
        settings.save_setting(HANDMADE_TOC_KEY, toc)?;
        settings.save_setting(HANDMADE_TOC_ENABLED_KEY, true)?;
        settings.save_setting(HANDMADE_TOC_EDIT_ENABLED_KEY, false)?;
        Ok(true)
    }
}
