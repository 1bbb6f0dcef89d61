//! Aggregate document shapes and well-known document names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Aggregate catalog totals.
pub const MANGA_DOCUMENT: &str = "manga.json";

/// Aggregate per-day history.
pub const DAILY_VIEWS_DOCUMENT: &str = "daily-views.json";

/// Flat staging: pending catalog-level views.
pub const PENDING_VIEWS_DOCUMENT: &str = "pending-views.json";

/// Flat staging: pending per-chapter views.
pub const PENDING_CHAPTER_VIEWS_DOCUMENT: &str = "pending-chapter-views.json";

/// Default name of the staging folder holding snapshot documents.
pub const DEFAULT_STAGING_FOLDER: &str = "data";

/// Cumulative totals for the catalog item (`manga.json`).
///
/// Fields the merge does not touch are kept in `extra` and written back
/// unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaDocument {
    #[serde(default)]
    pub manga: MangaTotals,

    /// Chapter id -> chapter totals. The set of ids is fixed by the catalog.
    #[serde(default)]
    pub chapters: BTreeMap<String, ChapterTotals>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `manga` section of [`MangaDocument`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaTotals {
    #[serde(default)]
    pub views: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single chapter entry of [`MangaDocument`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterTotals {
    #[serde(default)]
    pub views: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChapterTotals {
    pub fn with_views(views: u64) -> Self {
        Self {
            views,
            extra: Map::new(),
        }
    }
}

/// Per-day view history (`daily-views.json`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyViewsDocument {
    /// Date key -> counters for that day.
    #[serde(rename = "dailyRecords", default)]
    pub daily_records: BTreeMap<String, DailyRecord>,

    /// Instant of the last successful daily merge. Written as an ISO-8601
    /// string; any other JSON value already on disk is accepted and replaced
    /// on the next merge.
    #[serde(rename = "lastCleanup", default, skip_serializing_if = "Option::is_none")]
    pub last_cleanup: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Counters for a single calendar day.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(default)]
    pub manga: u64,

    /// Chapter id -> views that day. Entries are created on demand.
    #[serde(default)]
    pub chapters: BTreeMap<String, u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DailyRecord {
    pub fn new(manga: u64, chapters: BTreeMap<String, u64>) -> Self {
        Self {
            manga,
            chapters,
            extra: Map::new(),
        }
    }

    /// Total views recorded against chapters for this day.
    pub fn chapter_views(&self) -> u64 {
        self.chapters.values().sum()
    }
}
