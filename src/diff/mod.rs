//! Change detection: git CLI wrapper, path filtering, base branch
//! resolution, and the strategy chain that produces a [`ChangeSet`].
//!
//! [`ChangeSet`]: crate::models::ChangeSet

pub mod branch;
pub mod detect;
pub mod git;
pub mod parser;
pub mod paths;

use std::time::Duration;

use thiserror::Error;

pub use detect::{ChangeDetector, Strategy};
pub use git::{Git, GitRunner};

/// Errors from git invocations.
///
/// These never escape change detection; they are logged and turned into
/// "this strategy found nothing".
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("`git {command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`git {command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("not a git repository: {0}")]
    NotARepository(String),
}
