//! Flat-file pending merge run.

use super::{read_staging, Cleanup, RunOptions};
use crate::error::{MergeError, Result};
use crate::merge::{merge_flat, MangaMergeOutcome};
use crate::staging::{PendingChapterViews, PendingViews};
use crate::store::DocumentStore;
use crate::types::{
    MangaDocument, MANGA_DOCUMENT, PENDING_CHAPTER_VIEWS_DOCUMENT, PENDING_VIEWS_DOCUMENT,
};
use tracing::{debug, info, warn};

/// Result of [`run_flat`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatRunReport {
    pub outcome: MangaMergeOutcome,
    /// Whether `manga.json` was rewritten.
    pub persisted: bool,
    /// Disposal of each flat staging file, in a fixed order.
    pub cleanup: Vec<(&'static str, Cleanup)>,
}

impl FlatRunReport {
    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }
}

/// Fold the flat staging files into `manga.json`.
///
/// A missing or malformed `manga.json` aborts the run. Staging files that were
/// read are deleted, independently and best-effort, only after the aggregate
/// has been written. An unreadable staging file is left in place. When
/// nothing is pending nothing is written or deleted.
pub fn run_flat<S: DocumentStore>(store: &S, options: &RunOptions) -> Result<FlatRunReport> {
    let mut manga: MangaDocument = store
        .read(MANGA_DOCUMENT)?
        .ok_or_else(|| MergeError::MissingAggregate(MANGA_DOCUMENT.to_string()))?;

    let pending = read_staging(store, PENDING_VIEWS_DOCUMENT).map(|v| PendingViews::from_value(&v));
    let pending_chapters = read_staging(store, PENDING_CHAPTER_VIEWS_DOCUMENT)
        .map(|v| PendingChapterViews::from_value(&v));

    let outcome = merge_flat(&mut manga, pending.as_ref(), pending_chapters.as_ref());

    let staged = [PENDING_VIEWS_DOCUMENT, PENDING_CHAPTER_VIEWS_DOCUMENT];
    let kept = || -> Vec<(&'static str, Cleanup)> {
        staged.iter().map(|&name| (name, Cleanup::Kept)).collect()
    };

    if !outcome.changed() {
        info!("No pending views to merge");
        return Ok(FlatRunReport {
            outcome,
            persisted: false,
            cleanup: kept(),
        });
    }

    if options.dry_run {
        info!(
            manga_views = outcome.manga_views_added,
            chapter_views = outcome.chapter_views_added,
            "Dry run: would merge pending views"
        );
        return Ok(FlatRunReport {
            outcome,
            persisted: false,
            cleanup: kept(),
        });
    }

    store.write(MANGA_DOCUMENT, &manga)?;
    info!(
        manga_views = outcome.manga_views_added,
        chapter_views = outcome.chapter_views_added,
        chapters = outcome.chapters_updated,
        total_views = manga.manga.views,
        "Merged pending views into {}",
        MANGA_DOCUMENT
    );

    let consumed = [pending.is_some(), pending_chapters.is_some()];
    let cleanup = staged
        .iter()
        .zip(consumed)
        .map(|(&name, consumed)| (name, clean_staging_file(store, name, consumed)))
        .collect();

    Ok(FlatRunReport {
        outcome,
        persisted: true,
        cleanup,
    })
}

/// Delete a flat staging file once its contents have been folded in.
///
/// A file that exists but could not be read was never consumed and is kept
/// for the next run.
fn clean_staging_file<S: DocumentStore>(store: &S, name: &'static str, consumed: bool) -> Cleanup {
    if !consumed {
        if store.exists(name) {
            warn!(document = name, "Keeping unreadable staging file");
            return Cleanup::Kept;
        }
        return Cleanup::Skipped;
    }

    match store.delete_file(name) {
        Ok(removal) => {
            debug!(document = name, ?removal, "Staging file cleanup");
            Cleanup::from(removal)
        }
        Err(e) => {
            warn!(document = name, error = %e, "Failed to delete staging file");
            Cleanup::Failed(e.to_string())
        }
    }
}
