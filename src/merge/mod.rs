//! Pure merge functions.
//!
//! Each function folds staged deltas into an aggregate document in place and
//! reports what it added. Nothing here touches the filesystem; loading,
//! persisting and staging cleanup live in [`crate::pipeline`].

mod flat;
mod folder;

pub use flat::merge_flat;
pub use folder::{merge_daily_snapshot, merge_manga_snapshot, DailyMergeOutcome};

use crate::types::ChapterTotals;
use std::collections::BTreeMap;
use tracing::warn;

/// What a catalog-level merge added to `manga.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MangaMergeOutcome {
    /// Views added to `manga.views`.
    pub manga_views_added: u64,
    /// Views added across all known chapters.
    pub chapter_views_added: u64,
    /// Chapters whose counter moved.
    pub chapters_updated: usize,
    /// Chapter ids with a delta but no entry in the catalog.
    pub skipped_chapters: Vec<String>,
}

impl MangaMergeOutcome {
    /// Whether the aggregate document was modified.
    pub fn changed(&self) -> bool {
        self.manga_views_added > 0 || self.chapter_views_added > 0
    }
}

/// Add a chapter delta to an existing catalog chapter.
///
/// Catalog chapters are never created here: a delta for an unknown id is
/// dropped and recorded in `outcome.skipped_chapters`.
fn fold_chapter(
    chapters: &mut BTreeMap<String, ChapterTotals>,
    id: &str,
    delta: u64,
    outcome: &mut MangaMergeOutcome,
) {
    if delta == 0 {
        return;
    }

    match chapters.get_mut(id) {
        Some(chapter) => {
            chapter.views = chapter.views.saturating_add(delta);
            outcome.chapter_views_added = outcome.chapter_views_added.saturating_add(delta);
            outcome.chapters_updated += 1;
        }
        None => {
            warn!(chapter = id, views = delta, "Chapter not found in manga data, skipping");
            outcome.skipped_chapters.push(id.to_string());
        }
    }
}
