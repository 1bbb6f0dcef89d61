//! Folder-based pending merge: staged `manga.json` and `daily-views.json`.

use super::{fold_chapter, MangaMergeOutcome};
use crate::staging::{DailySnapshot, MangaSnapshot};
use crate::types::{DailyViewsDocument, MangaDocument};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Fold a staged `{ totalViews, chapters }` snapshot into the catalog totals.
///
/// A snapshot without a usable `totalViews` is ignored entirely. A
/// `totalViews` of zero leaves `manga.views` alone but still folds the
/// chapter deltas.
pub fn merge_manga_snapshot(
    manga: &mut MangaDocument,
    snapshot: Option<&MangaSnapshot>,
) -> MangaMergeOutcome {
    let mut outcome = MangaMergeOutcome::default();

    let Some(snapshot) = snapshot else {
        return outcome;
    };
    let Some(total_views) = snapshot.total_views else {
        warn!("Staged manga snapshot has no valid totalViews, skipping");
        return outcome;
    };

    if total_views > 0 {
        manga.manga.views = manga.manga.views.saturating_add(total_views);
        outcome.manga_views_added = total_views;
    }

    for (id, &delta) in &snapshot.chapters {
        fold_chapter(&mut manga.chapters, id, delta, &mut outcome);
    }

    outcome
}

/// What a daily merge did to `daily-views.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyMergeOutcome {
    /// Whether a usable snapshot was applied (and `lastCleanup` stamped).
    pub applied: bool,
    /// Dates that already existed and were summed into.
    pub dates_merged: usize,
    /// Dates inserted as new buckets.
    pub dates_inserted: usize,
    pub manga_views_added: u64,
    pub chapter_views_added: u64,
}

impl DailyMergeOutcome {
    pub fn changed(&self) -> bool {
        self.applied
    }
}

/// Fold a staged date-keyed snapshot into `dailyRecords`.
///
/// Existing dates are summed, new dates inserted as-is. Unlike catalog
/// chapters, per-day chapter entries are created on demand. `lastCleanup`
/// is set to `now` whenever a snapshot is applied, even an empty one.
pub fn merge_daily_snapshot(
    daily: &mut DailyViewsDocument,
    snapshot: Option<&DailySnapshot>,
    now: DateTime<Utc>,
) -> DailyMergeOutcome {
    let mut outcome = DailyMergeOutcome::default();

    let Some(snapshot) = snapshot else {
        return outcome;
    };

    for (date, day) in &snapshot.days {
        outcome.manga_views_added = outcome.manga_views_added.saturating_add(day.manga);
        outcome.chapter_views_added = outcome.chapter_views_added.saturating_add(day.chapter_views());

        match daily.daily_records.entry(date.clone()) {
            Entry::Occupied(mut existing) => {
                let record = existing.get_mut();
                record.manga = record.manga.saturating_add(day.manga);
                for (chapter, &views) in &day.chapters {
                    let counter = record.chapters.entry(chapter.clone()).or_insert(0);
                    *counter = counter.saturating_add(views);
                }
                outcome.dates_merged += 1;
                debug!(date = %date, manga = day.manga, "Merged into existing daily record");
            }
            Entry::Vacant(slot) => {
                slot.insert(day.clone());
                outcome.dates_inserted += 1;
                debug!(date = %date, manga = day.manga, "Inserted new daily record");
            }
        }
    }

    daily.last_cleanup = Some(Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)));
    outcome.applied = true;
    outcome
}
