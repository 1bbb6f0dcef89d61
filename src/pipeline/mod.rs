//! Merge orchestration: load, merge, persist, then clean up staging.
//!
//! Staging is only removed after the aggregate write it feeds has returned
//! successfully. A crash in between leaves staging in place to be merged
//! again on the next run.

mod flat;
mod folder;

pub use flat::{run_flat, FlatRunReport};
pub use folder::{run_folder, FolderRunReport, FolderRunStatus};

use crate::store::{DocumentStore, Removal};
use crate::types::DEFAULT_STAGING_FOLDER;
use serde_json::Value;
use tracing::warn;

/// Settings shared by both pipelines.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Staging folder name, relative to the data directory.
    pub staging_folder: String,

    /// Merge in memory and report, but never write or delete anything.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            staging_folder: DEFAULT_STAGING_FOLDER.to_string(),
            dry_run: false,
        }
    }
}

/// How a staging artifact was disposed of at the end of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cleanup {
    Removed,
    /// Already gone.
    Skipped,
    /// Deletion failed; the message is kept for reporting.
    Failed(String),
    /// Left alone on purpose (nothing merged, or dry run).
    Kept,
}

impl From<Removal> for Cleanup {
    fn from(removal: Removal) -> Self {
        match removal {
            Removal::Removed => Cleanup::Removed,
            Removal::Skipped => Cleanup::Skipped,
        }
    }
}

/// Read a staging document. Unreadable or malformed staging is logged and
/// treated as absent.
fn read_staging<S: DocumentStore>(store: &S, name: &str) -> Option<Value> {
    match store.read::<Value>(name) {
        Ok(value) => value,
        Err(e) => {
            warn!(document = name, error = %e, "Ignoring unusable staging document");
            None
        }
    }
}
