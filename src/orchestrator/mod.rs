//! Review pipeline: detect changes, read files, ask the LLM, persist the
//! review, then notify.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::ReviewConfig;
use crate::context;
use crate::diff::ChangeDetector;
use crate::models::{ChangeSet, FileContentMap, Review};
use crate::output::{Notifier, review_file_name, write_review};
use crate::providers::{ProviderError, ReviewProvider};

/// Errors that abort a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("review failed: {0}")]
    Review(#[from] ProviderError),

    #[error("failed to write review to {}", .0.display())]
    WriteFailed(PathBuf),
}

/// How a successful run ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Nothing to review; no LLM call was made and nothing was written.
    NoChanges,
    Reviewed(ReviewSummary),
}

/// What a completed review produced.
#[derive(Debug)]
pub struct ReviewSummary {
    pub files: Vec<String>,
    pub review: Review,
    /// Where the markdown was written.
    pub path: PathBuf,
    /// Notifiers that delivered successfully.
    pub notified: Vec<&'static str>,
    /// Notifiers that failed, with the reason. These never fail the run.
    pub notify_failures: Vec<(&'static str, String)>,
}

#[derive(Serialize)]
struct DebugDump<'a> {
    changes: &'a ChangeSet,
    contents: &'a FileContentMap,
}

/// One end-to-end review of the latest changes in a repository.
pub struct ReviewPipeline {
    detector: ChangeDetector,
    provider: Arc<dyn ReviewProvider>,
    repo_root: PathBuf,
    review: ReviewConfig,
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl ReviewPipeline {
    pub fn new(
        detector: ChangeDetector,
        provider: Arc<dyn ReviewProvider>,
        repo_root: impl Into<PathBuf>,
        review: ReviewConfig,
        notifiers: Vec<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            detector,
            provider,
            repo_root: repo_root.into(),
            review,
            notifiers,
        }
    }

    /// Directory reviews are written to. Relative paths are taken from the
    /// repository root.
    pub fn output_dir(&self) -> PathBuf {
        self.review.output_dir_in(&self.repo_root)
    }

    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let changes = self.detector.detect().await;
        if changes.files.is_empty() {
            info!("no changes to review");
            return Ok(PipelineOutcome::NoChanges);
        }
        info!("reviewing {} changed file(s)", changes.files.len());

        let contents = context::read_all(&self.repo_root, &changes.files).await;

        let now = Local::now();
        if self.review.debug_dump {
            self.dump_debug(&changes, &contents, now);
        }

        let review = self.provider.review(&contents).await.inspect_err(|e| {
            error!("LLM review failed: {e}");
        })?;

        let markdown = review.to_markdown();
        let path = self
            .output_dir()
            .join(review_file_name(self.review.naming, &review, now));
        if !write_review(&path, &markdown) {
            return Err(PipelineError::WriteFailed(path));
        }
        info!("review written to {}", path.display());

        let (notified, notify_failures) = self.notify(&markdown).await;

        Ok(PipelineOutcome::Reviewed(ReviewSummary {
            files: changes.files,
            review,
            path,
            notified,
            notify_failures,
        }))
    }

    /// Run every notifier concurrently and wait for all of them.
    async fn notify(&self, markdown: &str) -> (Vec<&'static str>, Vec<(&'static str, String)>) {
        let markdown: Arc<str> = Arc::from(markdown);
        let mut set = JoinSet::new();
        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let markdown = Arc::clone(&markdown);
            set.spawn(async move {
                let result = notifier.send(&markdown).await;
                (notifier.name(), result)
            });
        }

        let mut notified = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    info!("{name} notification sent");
                    notified.push(name);
                }
                Ok((name, Err(e))) => {
                    warn!("{name} notification failed: {e}");
                    failures.push((name, e.to_string()));
                }
                Err(e) => {
                    warn!("notification task failed: {e}");
                    failures.push(("unknown", e.to_string()));
                }
            }
        }
        (notified, failures)
    }

    fn dump_debug(&self, changes: &ChangeSet, contents: &FileContentMap, now: DateTime<Local>) {
        let dump = DebugDump { changes, contents };
        let target = debug_dump_path(&self.output_dir(), now);
        match serde_json::to_string_pretty(&dump) {
            Ok(json) => {
                if write_review(&target, &json) {
                    info!("debug dump written to {}", target.display());
                }
            }
            Err(e) => warn!("failed to serialize debug dump: {e}"),
        }
    }
}

fn debug_dump_path(output_dir: &Path, now: DateTime<Local>) -> PathBuf {
    output_dir.join(format!("debug_{}.json", now.timestamp_millis()))
}
