//! Flat-file pending merge.

use super::{fold_chapter, MangaMergeOutcome};
use crate::staging::{PendingChapterViews, PendingViews};
use crate::types::MangaDocument;

/// Fold `pending-views.json` and `pending-chapter-views.json` into the
/// catalog totals.
///
/// Either staging source may be absent. Zero deltas contribute nothing.
pub fn merge_flat(
    manga: &mut MangaDocument,
    pending: Option<&PendingViews>,
    pending_chapters: Option<&PendingChapterViews>,
) -> MangaMergeOutcome {
    let mut outcome = MangaMergeOutcome::default();

    if let Some(pending) = pending {
        if pending.pending_views > 0 {
            manga.manga.views = manga.manga.views.saturating_add(pending.pending_views);
            outcome.manga_views_added = pending.pending_views;
        }
    }

    if let Some(pending_chapters) = pending_chapters {
        for (id, &delta) in &pending_chapters.chapters {
            fold_chapter(&mut manga.chapters, id, delta, &mut outcome);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manga(value: serde_json::Value) -> MangaDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let mut doc = manga(json!({"manga": {"views": 100}, "chapters": {"ch1": {"views": 10}}}));
        let pending = PendingViews::from_value(&json!({"pendingViews": 5}));
        let chapters = PendingChapterViews::from_value(&json!({
            "chapters": {"ch1": {"pendingViews": 3}, "ch2": {"pendingViews": 7}}
        }));

        let outcome = merge_flat(&mut doc, Some(&pending), Some(&chapters));

        assert!(outcome.changed());
        assert_eq!(outcome.manga_views_added, 5);
        assert_eq!(outcome.chapter_views_added, 3);
        assert_eq!(outcome.skipped_chapters, vec!["ch2".to_string()]);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"manga": {"views": 105}, "chapters": {"ch1": {"views": 13}}})
        );
    }

    #[test]
    fn test_nothing_pending() {
        let original = manga(json!({"manga": {"views": 100}, "chapters": {"ch1": {"views": 10}}}));
        let mut doc = original.clone();

        let outcome = merge_flat(&mut doc, None, None);

        assert!(!outcome.changed());
        assert_eq!(doc, original);
    }

    #[test]
    fn test_zero_pending_is_noop() {
        let original = manga(json!({"manga": {"views": 100}}));
        let mut doc = original.clone();
        let pending = PendingViews { pending_views: 0 };
        let chapters = PendingChapterViews::from_value(&json!({"chapters": {"ch1": {"pendingViews": 0}}}));

        let outcome = merge_flat(&mut doc, Some(&pending), Some(&chapters));

        assert!(!outcome.changed());
        assert!(outcome.skipped_chapters.is_empty());
        assert_eq!(doc, original);
    }

    #[test]
    fn test_absent_views_treated_as_zero() {
        let mut doc = manga(json!({"manga": {}, "chapters": {"ch1": {"title": "One"}}}));
        let pending = PendingViews { pending_views: 2 };
        let chapters = PendingChapterViews::from_value(&json!({"chapters": {"ch1": {"pendingViews": 4}}}));

        merge_flat(&mut doc, Some(&pending), Some(&chapters));

        assert_eq!(doc.manga.views, 2);
        assert_eq!(doc.chapters["ch1"].views, 4);
        assert_eq!(doc.chapters["ch1"].extra["title"], "One");
    }

    #[test]
    fn test_only_unknown_chapters_is_not_a_change() {
        let original = manga(json!({"manga": {"views": 1}, "chapters": {"ch1": {"views": 1}}}));
        let mut doc = original.clone();
        let chapters = PendingChapterViews::from_value(&json!({"chapters": {"ch9": {"pendingViews": 4}}}));

        let outcome = merge_flat(&mut doc, None, Some(&chapters));

        assert!(!outcome.changed());
        assert_eq!(outcome.skipped_chapters, vec!["ch9".to_string()]);
        assert_eq!(doc, original);
    }

    #[test]
    fn test_chapters_only() {
        let mut doc = manga(json!({
            "manga": {"views": 1},
            "chapters": {"ch1": {"views": 1}, "ch2": {"views": 2}}
        }));
        let chapters = PendingChapterViews::from_value(&json!({
            "chapters": {"ch1": {"pendingViews": 1}, "ch2": {"pendingViews": 2}}
        }));

        let outcome = merge_flat(&mut doc, None, Some(&chapters));

        assert!(outcome.changed());
        assert_eq!(outcome.manga_views_added, 0);
        assert_eq!(outcome.chapter_views_added, 3);
        assert_eq!(outcome.chapters_updated, 2);
        assert_eq!(doc.manga.views, 1);
        assert_eq!(doc.chapters["ch2"].views, 4);
    }
}
