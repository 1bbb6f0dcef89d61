//! Property tests for the additive merge invariants.

use chrono::Utc;
use manga_views::{
    merge_daily_snapshot, merge_flat, merge_manga_snapshot, ChapterTotals, DailyRecord,
    DailySnapshot, DailyViewsDocument, MangaDocument, MangaSnapshot, PendingChapterViews,
    PendingViews,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn catalog(views: u64, chapters: &BTreeMap<String, u64>) -> MangaDocument {
    let mut doc = MangaDocument::default();
    doc.manga.views = views;
    doc.chapters = chapters
        .iter()
        .map(|(id, &v)| (id.clone(), ChapterTotals::with_views(v)))
        .collect();
    doc
}

fn chapter_map() -> impl Strategy<Value = BTreeMap<String, u64>> {
    prop::collection::btree_map("ch[0-9]{1,2}", 0u64..1_000_000, 0..8)
}

proptest! {
    #[test]
    fn flat_pending_views_are_added(v in 0u64..1_000_000_000, p in 0u64..1_000_000) {
        let mut doc = catalog(v, &BTreeMap::new());
        let outcome = merge_flat(&mut doc, Some(&PendingViews { pending_views: p }), None);

        prop_assert_eq!(doc.manga.views, v + p);
        prop_assert_eq!(outcome.changed(), p > 0);
    }

    #[test]
    fn chapter_deltas_never_create_chapters(
        existing in chapter_map(),
        deltas in chapter_map(),
    ) {
        let mut doc = catalog(0, &existing);
        let pending = PendingChapterViews { chapters: deltas.clone() };

        merge_flat(&mut doc, None, Some(&pending));

        prop_assert_eq!(
            doc.chapters.keys().collect::<Vec<_>>(),
            existing.keys().collect::<Vec<_>>()
        );
        for (id, &before) in &existing {
            let added = deltas.get(id).copied().unwrap_or(0);
            prop_assert_eq!(doc.chapters[id].views, before + added);
        }
    }

    #[test]
    fn snapshot_chapters_never_created(
        existing in chapter_map(),
        deltas in chapter_map(),
        total in 0u64..1_000,
    ) {
        let mut doc = catalog(10, &existing);
        let snapshot = MangaSnapshot { total_views: Some(total), chapters: deltas };

        merge_manga_snapshot(&mut doc, Some(&snapshot));

        prop_assert_eq!(doc.manga.views, 10 + total);
        prop_assert_eq!(doc.chapters.len(), existing.len());
    }

    #[test]
    fn daily_merge_sums_per_date(
        first in prop::collection::btree_map("2024-0[1-9]-[12][0-9]", (0u64..1_000, chapter_map()), 0..6),
        second in prop::collection::btree_map("2024-0[1-9]-[12][0-9]", (0u64..1_000, chapter_map()), 0..6),
    ) {
        let to_snapshot = |days: &BTreeMap<String, (u64, BTreeMap<String, u64>)>| DailySnapshot {
            days: days
                .iter()
                .map(|(date, (manga, chapters))| {
                    (date.clone(), DailyRecord::new(*manga, chapters.clone()))
                })
                .collect(),
        };

        let mut doc = DailyViewsDocument::default();
        merge_daily_snapshot(&mut doc, Some(&to_snapshot(&first)), Utc::now());
        merge_daily_snapshot(&mut doc, Some(&to_snapshot(&second)), Utc::now());

        for (date, record) in &doc.daily_records {
            let a = first.get(date);
            let b = second.get(date);
            let manga = a.map_or(0, |d| d.0) + b.map_or(0, |d| d.0);
            prop_assert_eq!(record.manga, manga);

            for (chapter, &views) in &record.chapters {
                let expected = a.and_then(|d| d.1.get(chapter)).copied().unwrap_or(0)
                    + b.and_then(|d| d.1.get(chapter)).copied().unwrap_or(0);
                prop_assert_eq!(views, expected);
            }
        }
        prop_assert!(doc.last_cleanup.is_some());
    }
}
