//! # Pending view merge
//!
//! Folds staged view-count increments for a manga archive into the durable
//! aggregate documents and then discards the staging files.
//!
//! ## Pipelines
//!
//! - **Flat**: `pending-views.json` and `pending-chapter-views.json` are
//!   added into `manga.json`, then both staging files are deleted.
//! - **Folder**: a staging folder (`data/` by default) holding a `manga.json`
//!   snapshot and a date-keyed `daily-views.json` is folded into `manga.json`
//!   and `daily-views.json`, then the whole folder is deleted.
//!
//! Staging is only deleted after the aggregate write it feeds succeeded.
//! Runs are assumed to be serialized; [`FsStore::lock`] provides an opt-in
//! advisory lock when they are not.
//!
//! ## Example
//!
//! ```ignore
//! use manga_views::{run_flat, run_folder, FsStore, RunOptions};
//!
//! let store = FsStore::open("./public")?;
//! let options = RunOptions::default();
//!
//! let report = run_flat(&store, &options)?;
//! println!("added {} views", report.outcome.manga_views_added);
//!
//! run_folder(&store, &options)?;
//! ```

pub mod error;
pub mod merge;
pub mod pipeline;
pub mod staging;
pub mod store;
pub mod types;

// Re-exports
pub use error::{MergeError, Result};
pub use merge::{
    merge_daily_snapshot, merge_flat, merge_manga_snapshot, DailyMergeOutcome, MangaMergeOutcome,
};
pub use pipeline::{
    run_flat, run_folder, Cleanup, FlatRunReport, FolderRunReport, FolderRunStatus, RunOptions,
};
pub use staging::{DailySnapshot, MangaSnapshot, PendingChapterViews, PendingViews};
pub use store::{DocumentStore, FsStore, Removal, StoreLock};
pub use types::*;
