//! The `sync-content` command: arguments and the run itself, separate from
//! process setup so it can be driven against any store.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::{error, info};

use crate::content::{self, ContentError};
use crate::services::{SyncError, SyncOptions, SyncPolicy, SyncReport, SyncService};
use crate::store::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Only {
    Lessons,
    Resources,
    All,
}

/// Push the static lesson and resource lists into the content store.
/// Safe to re-run: rows whose key already exists are skipped.
///
/// The bundled 6-12 and 13-20 lesson sets both define days 11 and 12.
/// `--prefer` names the file that owns such days; the bundled resources
/// follow the 13-20 set.
#[derive(Debug, Parser)]
#[command(name = "sync-content", version)]
pub struct SyncArgs {
    /// Lesson JSON file; repeat to merge several.
    #[arg(
        long = "lessons",
        default_values = [
            "content/lessons.json",
            "content/lessons_6_12.json",
            "content/lessons_13_20.json",
            "content/lessons_21_30.json",
        ]
    )]
    pub lessons: Vec<PathBuf>,

    /// Lesson file that wins when two files define the same day
    /// differently. Without it such a day is an error.
    #[arg(long, default_value = "content/lessons_13_20.json")]
    pub prefer: Option<PathBuf>,

    /// Resource JSON file.
    #[arg(long, default_value = "content/resources.json")]
    pub resources: PathBuf,

    #[arg(long, value_enum, default_value_t = Only::All)]
    pub only: Only,

    /// Stop at the first store error instead of recording it and continuing.
    #[arg(long)]
    pub fail_fast: bool,

    /// Report what would be inserted without writing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Reports from one run; `None` for a table skipped by `--only`.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub lessons: Option<SyncReport>,
    pub resources: Option<SyncReport>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        [&self.lessons, &self.resources]
            .into_iter()
            .flatten()
            .any(SyncReport::has_failures)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

fn summarize(label: &str, report: &SyncReport) {
    let stats = &report.stats;
    info!(
        "{}: {} inserted, {} already present, {} would insert, {} orphaned, {} failed",
        label,
        stats.inserted,
        stats.already_present,
        stats.would_insert,
        stats.orphaned,
        stats.failed
    );
}

pub async fn run(args: SyncArgs, store: Arc<dyn ContentStore>) -> Result<RunSummary, CliError> {
    let options = SyncOptions {
        policy: if args.fail_fast {
            SyncPolicy::FailFast
        } else {
            SyncPolicy::ContinueOnError
        },
        dry_run: args.dry_run,
    };
    let service = SyncService::new(store, options);
    let mut summary = RunSummary::default();

    if matches!(args.only, Only::Lessons | Only::All) {
        let lessons = content::load_lessons(args.lessons.as_slice(), args.prefer.as_deref())?;
        let report = service.sync_lessons(&lessons).await?;
        summarize("lessons", &report);
        summary.lessons = Some(report);
    }

    if matches!(args.only, Only::Resources | Only::All) {
        let resources = content::load_resources(&args.resources)?;
        let report = service.sync_resources(&resources).await?;
        summarize("resources", &report);
        summary.resources = Some(report);
    }

    if summary.has_failures() {
        error!("some records failed to sync; re-run once the store is reachable");
    }
    Ok(summary)
}
