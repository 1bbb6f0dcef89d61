//! Staging document shapes.
//!
//! Staging files come from an external view tracker and are only checked for
//! presence and type: a count that is missing, negative, fractional or not a
//! number simply contributes nothing. Aggregate documents, by contrast, are
//! parsed strictly (see [`crate::types`]).

use crate::types::DailyRecord;
use serde_json::Value;
use std::collections::BTreeMap;

/// Reads a non-negative integer field, if present and well typed.
fn count(value: &Value, field: &str) -> Option<u64> {
    value.get(field).and_then(Value::as_u64)
}

/// Reads an `id -> integer` map, dropping entries that are not counts.
fn count_map(value: Option<&Value>) -> BTreeMap<String, u64> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(id, n)| n.as_u64().map(|n| (id.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

/// `pending-views.json`: `{ pendingViews }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingViews {
    pub pending_views: u64,
}

impl PendingViews {
    pub fn from_value(value: &Value) -> Self {
        Self {
            pending_views: count(value, "pendingViews").unwrap_or(0),
        }
    }
}

/// `pending-chapter-views.json`: `{ chapters: { id: { pendingViews } } }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingChapterViews {
    pub chapters: BTreeMap<String, u64>,
}

impl PendingChapterViews {
    pub fn from_value(value: &Value) -> Self {
        let chapters = value
            .get("chapters")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(id, entry)| (id.clone(), count(entry, "pendingViews").unwrap_or(0)))
                    .collect()
            })
            .unwrap_or_default();

        Self { chapters }
    }
}

/// Staged `manga.json` snapshot: `{ totalViews, chapters: { id: n } }`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MangaSnapshot {
    /// `None` when `totalViews` is missing or not a count, which marks the
    /// whole snapshot as unusable.
    pub total_views: Option<u64>,
    pub chapters: BTreeMap<String, u64>,
}

impl MangaSnapshot {
    pub fn from_value(value: &Value) -> Self {
        Self {
            total_views: count(value, "totalViews"),
            chapters: count_map(value.get("chapters")),
        }
    }
}

/// Staged `daily-views.json`: `{ date: { mangaViews | manga, chapters } }`,
/// normalized into [`DailyRecord`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailySnapshot {
    pub days: BTreeMap<String, DailyRecord>,
}

impl DailySnapshot {
    /// Returns `None` if the document is not a date-keyed object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let days = obj
            .iter()
            .map(|(date, day)| (date.clone(), normalize_day(day)))
            .collect();
        Some(Self { days })
    }
}

/// `mangaViews` wins over `manga` when both are usable counts.
fn normalize_day(day: &Value) -> DailyRecord {
    let manga = count(day, "mangaViews")
        .or_else(|| count(day, "manga"))
        .unwrap_or(0);

    DailyRecord::new(manga, count_map(day.get("chapters")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pending_views_lenient() {
        assert_eq!(PendingViews::from_value(&json!({"pendingViews": 5})).pending_views, 5);
        assert_eq!(PendingViews::from_value(&json!({"pendingViews": -3})).pending_views, 0);
        assert_eq!(PendingViews::from_value(&json!({"pendingViews": "5"})).pending_views, 0);
        assert_eq!(PendingViews::from_value(&json!({})).pending_views, 0);
        assert_eq!(PendingViews::from_value(&json!([1, 2])).pending_views, 0);
    }

    #[test]
    fn test_pending_chapter_views() {
        let pending = PendingChapterViews::from_value(&json!({
            "chapters": {
                "ch1": {"pendingViews": 3},
                "ch2": {"pendingViews": 0},
                "ch3": {"other": 1}
            }
        }));

        assert_eq!(pending.chapters["ch1"], 3);
        assert_eq!(pending.chapters["ch2"], 0);
        assert_eq!(pending.chapters["ch3"], 0);

        let empty = PendingChapterViews::from_value(&json!({"chapters": 12}));
        assert!(empty.chapters.is_empty());
    }

    #[test]
    fn test_manga_snapshot() {
        let snapshot = MangaSnapshot::from_value(&json!({
            "totalViews": 12,
            "chapters": {"ch1": 4, "ch2": "x"}
        }));
        assert_eq!(snapshot.total_views, Some(12));
        assert_eq!(snapshot.chapters.len(), 1);
        assert_eq!(snapshot.chapters["ch1"], 4);

        let zero = MangaSnapshot::from_value(&json!({"totalViews": 0}));
        assert_eq!(zero.total_views, Some(0));

        let missing = MangaSnapshot::from_value(&json!({"chapters": {"ch1": 1}}));
        assert_eq!(missing.total_views, None);
    }

    #[test]
    fn test_daily_snapshot_field_spellings() {
        let snapshot = DailySnapshot::from_value(&json!({
            "2024-01-01": {"mangaViews": 4, "manga": 9, "chapters": {"ch1": 2}},
            "2024-01-02": {"manga": 6},
            "2024-01-03": {},
            "2024-01-04": {"mangaViews": "bad", "manga": 1}
        }))
        .unwrap();

        assert_eq!(snapshot.days["2024-01-01"].manga, 4);
        assert_eq!(snapshot.days["2024-01-01"].chapters["ch1"], 2);
        assert_eq!(snapshot.days["2024-01-02"].manga, 6);
        assert!(snapshot.days["2024-01-02"].chapters.is_empty());
        assert_eq!(snapshot.days["2024-01-03"], DailyRecord::default());
        assert_eq!(snapshot.days["2024-01-04"].manga, 1);
    }

    #[test]
    fn test_daily_snapshot_requires_object() {
        assert!(DailySnapshot::from_value(&json!([1, 2, 3])).is_none());
        assert!(DailySnapshot::from_value(&json!(null)).is_none());
        assert!(DailySnapshot::from_value(&json!({})).unwrap().days.is_empty());
    }
}
