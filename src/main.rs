use clap::{Parser, Subcommand};
use manga_views::{
    run_flat, run_folder, FolderRunStatus, FsStore, MergeError, RunOptions,
    DEFAULT_STAGING_FOLDER,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "manga-views", version, about = "Merge pending manga view counts into the aggregate data")]
struct Cli {
    /// Directory holding manga.json, daily-views.json and the staging files
    #[arg(long, env = "MANGA_VIEWS_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Staging folder name, relative to the data directory
    #[arg(long, env = "MANGA_VIEWS_STAGING_DIR", default_value = DEFAULT_STAGING_FOLDER)]
    staging_dir: String,

    /// Hold an exclusive lock on the data directory for the whole run
    #[arg(long, default_value_t = false)]
    lock: bool,

    /// Compute and log the merge without writing or deleting anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Merge pending-views.json and pending-chapter-views.json into manga.json
    Flat,
    /// Merge the staging folder into manga.json and daily-views.json
    Folder,
    /// Run the flat merge, then the folder merge
    All,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Merge failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), MergeError> {
    let store = FsStore::open(&cli.data_dir)?;
    let _lock = if cli.lock { Some(store.lock()?) } else { None };

    let options = RunOptions {
        staging_folder: cli.staging_dir.clone(),
        dry_run: cli.dry_run,
    };

    if matches!(cli.command, Command::Flat | Command::All) {
        info!(data_dir = %store.root().display(), "Merging flat pending views");
        let report = run_flat(&store, &options)?;
        if report.changed() {
            info!(
                manga_views = report.outcome.manga_views_added,
                chapter_views = report.outcome.chapter_views_added,
                skipped_chapters = report.outcome.skipped_chapters.len(),
                "Flat merge complete"
            );
        }
    }

    if matches!(cli.command, Command::Folder | Command::All) {
        info!(data_dir = %store.root().display(), folder = %options.staging_folder, "Merging staging folder");
        match run_folder(&store, &options)? {
            FolderRunStatus::NothingToMerge => {}
            FolderRunStatus::Processed(report) => {
                info!(changes_made = report.changes_made, cleanup = ?report.cleanup, "Folder merge complete");
            }
        }
    }

    Ok(())
}
