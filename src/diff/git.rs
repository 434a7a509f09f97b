//! Git CLI wrapper.
//!
//! Shells out to `git` via `tokio::process::Command`. Every invocation is
//! bounded by a timeout; a command that overruns is killed and reported
//! as failed.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use super::DiffError;

/// Runs git commands and captures their standard output.
///
/// The change detector only depends on this trait, so tests can script
/// git's answers without a real repository.
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` and return stdout.
    ///
    /// Spawn failures, timeouts and non-zero exits are all errors.
    async fn run(&self, args: &[&str]) -> Result<String, DiffError>;
}

/// [`GitRunner`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct Git {
    work_dir: PathBuf,
    timeout: Duration,
}

impl Git {
    pub fn new(work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            work_dir: work_dir.into(),
            timeout,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[async_trait]
impl GitRunner for Git {
    async fn run(&self, args: &[&str]) -> Result<String, DiffError> {
        let command = args.join(" ");
        let mut cmd = tokio::process::Command::new("git");
        cmd.args(args)
            .current_dir(&self.work_dir)
            // Never block on a credential prompt during `fetch`.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| DiffError::Timeout {
                command: command.clone(),
                timeout: self.timeout,
            })??;

        if !output.status.success() {
            return Err(DiffError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Find the root of the working tree git is running in.
pub async fn find_repo_root(git: &dyn GitRunner) -> Result<PathBuf, DiffError> {
    match git.run(&["rev-parse", "--show-toplevel"]).await {
        Ok(out) => Ok(PathBuf::from(out.trim())),
        Err(e) => Err(DiffError::NotARepository(e.to_string())),
    }
}

/// Split command output into trimmed, non-empty lines.
pub(crate) fn output_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::test_support::{commit_all, init_repo};

    fn git_in(dir: &Path) -> Git {
        Git::new(dir, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn run_returns_stdout() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());

        let out = git_in(dir.path())
            .run(&["rev-parse", "--is-inside-work-tree"])
            .await
            .unwrap();
        assert_eq!(out.trim(), "true");
    }

    #[tokio::test]
    async fn run_reports_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let err = git_in(dir.path())
            .run(&["rev-parse", "--is-inside-work-tree"])
            .await
            .unwrap_err();
        assert!(matches!(err, DiffError::CommandFailed { .. }), "got: {err}");
        assert!(err.to_string().contains("rev-parse"), "got: {err}");
    }

    #[tokio::test]
    async fn run_reports_missing_work_dir() {
        let git = git_in(Path::new("/tmp/codesentinel_no_such_dir/nested"));
        let err = git.run(&["status"]).await.unwrap_err();
        assert!(matches!(err, DiffError::Spawn(_)), "got: {err}");
    }

    #[tokio::test]
    async fn run_reports_timeout_for_slow_command() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::new(dir.path(), Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = git
            .run(&["-c", "alias.stall=!sleep 5", "stall"])
            .await
            .unwrap_err();

        match &err {
            DiffError::Timeout { command, timeout } => {
                assert!(command.ends_with("stall"), "got: {command}");
                assert_eq!(*timeout, Duration::from_millis(200));
            }
            other => panic!("expected timeout, got: {other}"),
        }
        assert!(err.to_string().contains("timed out"), "got: {err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn find_repo_root_non_git() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_repo_root(&git_in(dir.path())).await.unwrap_err();
        assert!(err.to_string().contains("not a git repository"), "got: {err}");
    }

    #[tokio::test]
    async fn find_repo_root_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        init_repo(dir.path());
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "fn x() {}\n").unwrap();
        commit_all(dir.path(), "init");

        let root = find_repo_root(&git_in(&dir.path().join("src/nested")))
            .await
            .unwrap();
        assert_eq!(
            root.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn output_lines_skips_blanks() {
        let lines: Vec<_> = output_lines("a.rs\n\n  b.rs \r\n").collect();
        assert_eq!(lines, vec!["a.rs", "b.rs"]);
    }
}
