//! Folder-based pending merge run.

use super::{read_staging, Cleanup, RunOptions};
use crate::error::{MergeError, Result};
use crate::merge::{merge_daily_snapshot, merge_manga_snapshot, DailyMergeOutcome, MangaMergeOutcome};
use crate::staging::{DailySnapshot, MangaSnapshot};
use crate::store::DocumentStore;
use crate::types::{DailyViewsDocument, MangaDocument, DAILY_VIEWS_DOCUMENT, MANGA_DOCUMENT};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Result of [`run_folder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolderRunStatus {
    /// The staging folder does not exist.
    NothingToMerge,
    /// The staging folder was processed.
    Processed(FolderRunReport),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderRunReport {
    /// `None` when the staged manga snapshot was absent or skipped.
    pub manga: Option<MangaMergeOutcome>,
    /// `None` when the staged daily snapshot was absent or skipped.
    pub daily: Option<DailyMergeOutcome>,
    /// Whether at least one aggregate document was rewritten (or would be,
    /// in a dry run).
    pub changes_made: bool,
    pub cleanup: Cleanup,
}

/// Fold the staging folder into `manga.json` and `daily-views.json`, then
/// remove the folder.
///
/// Each staged document is handled independently; a missing one does not
/// block the other. A staged document is deleted as soon as its aggregate has
/// been written, so a later failure (an unreadable `daily-views.json`, say)
/// never causes it to be merged again. If an aggregate write fails the run
/// stops and the unconsumed staging files survive. Once a change has been
/// persisted, failing to remove a staged document or the folder is fatal
/// because anything left behind would be merged twice.
pub fn run_folder<S: DocumentStore>(store: &S, options: &RunOptions) -> Result<FolderRunStatus> {
    let folder = options.staging_folder.as_str();

    if !store.exists(folder) {
        info!(folder, "No staging folder found, nothing to merge");
        return Ok(FolderRunStatus::NothingToMerge);
    }

    let manga = merge_staged_manga(store, folder, options)?;
    let daily = merge_staged_daily(store, folder, options)?;

    let changes_made = manga.as_ref().is_some_and(MangaMergeOutcome::changed)
        || daily.as_ref().is_some_and(DailyMergeOutcome::changed);

    let cleanup = if options.dry_run {
        info!(folder, changes_made, "Dry run: staging folder kept");
        Cleanup::Kept
    } else if changes_made {
        match store.delete_folder(folder) {
            Ok(removal) => {
                info!(folder, "Removed staging folder after merge");
                Cleanup::from(removal)
            }
            Err(source) => {
                error!(folder, error = %source, "Failed to remove staging folder after merge");
                return Err(MergeError::StagingCleanup {
                    name: folder.to_string(),
                    source,
                });
            }
        }
    } else {
        match store.delete_folder(folder) {
            Ok(removal) => {
                info!(folder, "No changes merged, removed empty or invalid staging folder");
                Cleanup::from(removal)
            }
            Err(e) => {
                warn!(folder, error = %e, "Failed to remove staging folder");
                Cleanup::Failed(e.to_string())
            }
        }
    };

    Ok(FolderRunStatus::Processed(FolderRunReport {
        manga,
        daily,
        changes_made,
        cleanup,
    }))
}

fn merge_staged_manga<S: DocumentStore>(
    store: &S,
    folder: &str,
    options: &RunOptions,
) -> Result<Option<MangaMergeOutcome>> {
    let name = format!("{folder}/{MANGA_DOCUMENT}");
    let Some(staged) = read_staging(store, &name) else {
        return Ok(None);
    };
    let Some(mut aggregate) = store.read::<MangaDocument>(MANGA_DOCUMENT)? else {
        warn!(staging = %name, "{} not found, skipping staged manga views", MANGA_DOCUMENT);
        return Ok(None);
    };

    let snapshot = MangaSnapshot::from_value(&staged);
    let outcome = merge_manga_snapshot(&mut aggregate, Some(&snapshot));

    if outcome.changed() && !options.dry_run {
        store.write(MANGA_DOCUMENT, &aggregate)?;
        info!(
            manga_views = outcome.manga_views_added,
            chapter_views = outcome.chapter_views_added,
            total_views = aggregate.manga.views,
            "Merged staged manga views into {}",
            MANGA_DOCUMENT
        );
        consume_staging(store, &name)?;
    }

    Ok(Some(outcome))
}

fn merge_staged_daily<S: DocumentStore>(
    store: &S,
    folder: &str,
    options: &RunOptions,
) -> Result<Option<DailyMergeOutcome>> {
    let name = format!("{folder}/{DAILY_VIEWS_DOCUMENT}");
    let Some(staged) = read_staging(store, &name) else {
        return Ok(None);
    };
    let Some(mut aggregate) = store.read::<DailyViewsDocument>(DAILY_VIEWS_DOCUMENT)? else {
        warn!(staging = %name, "{} not found, skipping staged daily views", DAILY_VIEWS_DOCUMENT);
        return Ok(None);
    };

    let snapshot = DailySnapshot::from_value(&staged);
    if snapshot.is_none() {
        warn!(staging = %name, "Staged daily views are not a date-keyed object, skipping");
    }
    let outcome = merge_daily_snapshot(&mut aggregate, snapshot.as_ref(), Utc::now());

    if outcome.changed() && !options.dry_run {
        store.write(DAILY_VIEWS_DOCUMENT, &aggregate)?;
        info!(
            dates_merged = outcome.dates_merged,
            dates_inserted = outcome.dates_inserted,
            manga_views = outcome.manga_views_added,
            chapter_views = outcome.chapter_views_added,
            "Merged staged daily views into {}",
            DAILY_VIEWS_DOCUMENT
        );
        consume_staging(store, &name)?;
    }

    Ok(Some(outcome))
}

/// Remove a staged document whose contents are now in the aggregate.
fn consume_staging<S: DocumentStore>(store: &S, name: &str) -> Result<()> {
    match store.delete_file(name) {
        Ok(removal) => {
            debug!(staging = name, ?removal, "Removed merged staging file");
            Ok(())
        }
        Err(source) => {
            error!(staging = name, error = %source, "Failed to remove merged staging file");
            Err(MergeError::StagingCleanup {
                name: name.to_string(),
                source,
            })
        }
    }
}
