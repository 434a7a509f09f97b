//! Change detection strategy chain.
//!
//! Strategies are tried strictly in [`Strategy::ORDER`]; the first one that
//! yields anything becomes the change set and the rest are never run.
//! Every git failure is local to its strategy: it is logged at debug level
//! and the chain moves on. Detection itself never fails.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::branch::resolve_default_branch;
use super::git::{GitRunner, output_lines};
use super::parser::extract_paths;
use super::paths::is_valid_path;
use crate::config::GitConfig;
use crate::constants::FULL_DIFF_CONTEXT;
use crate::models::ChangeSet;

/// One git comparison in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Full unified diff of `HEAD^..HEAD`.
    FullDiff,
    /// Names changed on this branch relative to `<remote>/<base>`.
    RemoteBase,
    /// Names changed on this branch relative to the local `<base>`.
    LocalBase,
    /// Names with uncommitted working-tree changes.
    Uncommitted,
    /// Names changed by the last commit.
    LastCommit,
}

impl Strategy {
    /// Fixed priority order.
    pub const ORDER: [Strategy; 5] = [
        Strategy::FullDiff,
        Strategy::RemoteBase,
        Strategy::LocalBase,
        Strategy::Uncommitted,
        Strategy::LastCommit,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::FullDiff => "last commit full diff",
            Strategy::RemoteBase => "remote branch comparison",
            Strategy::LocalBase => "local branch comparison",
            Strategy::Uncommitted => "uncommitted changes",
            Strategy::LastCommit => "last commit changes",
        };
        f.write_str(name)
    }
}

/// Finds the files changed by the current branch or commit.
pub struct ChangeDetector {
    git: Arc<dyn GitRunner>,
    remote: String,
    base_branch: Option<String>,
    fetch: bool,
}

impl ChangeDetector {
    pub fn new(git: Arc<dyn GitRunner>, config: &GitConfig) -> Self {
        Self {
            git,
            remote: config.remote.clone(),
            base_branch: config.base_branch.clone(),
            fetch: config.fetch,
        }
    }

    /// Run the strategy chain and return the first non-empty change set.
    ///
    /// Returns [`ChangeSet::empty`] outside a working tree or when no
    /// strategy finds anything.
    pub async fn detect(&self) -> ChangeSet {
        match self.git.run(&["rev-parse", "--is-inside-work-tree"]).await {
            Ok(out) if out.trim() == "true" => {}
            Ok(out) => {
                error!("not inside a git working tree (rev-parse said {:?})", out.trim());
                return ChangeSet::empty();
            }
            Err(e) => {
                error!("not in a git repository: {e}");
                return ChangeSet::empty();
            }
        }

        match self.git.run(&["branch", "--show-current"]).await {
            Ok(out) if !out.trim().is_empty() => info!("current branch: {}", out.trim()),
            Ok(_) => info!("current branch: (detached HEAD)"),
            Err(e) => warn!("could not determine current branch: {e}"),
        }

        if self.fetch {
            info!("fetching latest changes from {}", self.remote);
            if let Err(e) = self.git.run(&["fetch", self.remote.as_str()]).await {
                warn!("could not fetch {}: {e}", self.remote);
            }
        }

        let base = match &self.base_branch {
            Some(branch) => branch.clone(),
            None => resolve_default_branch(self.git.as_ref(), &self.remote).await,
        };
        info!("comparing against base branch: {base}");

        for strategy in Strategy::ORDER {
            debug!("trying {strategy}");
            if let Some(changes) = self.run_strategy(strategy, &base).await {
                info!("found {} changed file(s) ({strategy})", changes.files.len());
                for file in &changes.files {
                    debug!("  - {file}");
                }
                return changes;
            }
        }

        warn!("no file changes detected");
        ChangeSet::empty()
    }

    async fn run_strategy(&self, strategy: Strategy, base: &str) -> Option<ChangeSet> {
        match strategy {
            Strategy::FullDiff => self.full_diff().await,
            Strategy::RemoteBase => {
                let range = format!("{}/{base}...HEAD", self.remote);
                self.name_only(strategy, &["diff", "--name-only", range.as_str()]).await
            }
            Strategy::LocalBase => {
                let range = format!("{base}...HEAD");
                self.name_only(strategy, &["diff", "--name-only", range.as_str()]).await
            }
            Strategy::Uncommitted => self.name_only(strategy, &["diff", "--name-only"]).await,
            Strategy::LastCommit => {
                self.name_only(strategy, &["diff", "--name-only", "HEAD~1..HEAD"])
                    .await
            }
        }
    }

    /// Whole-commit diff with effectively unlimited context.
    async fn full_diff(&self) -> Option<ChangeSet> {
        let context = format!("--unified={FULL_DIFF_CONTEXT}");
        let args = [
            "--no-pager",
            "diff",
            "--no-color",
            "--find-renames",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            context.as_str(),
            "HEAD^",
            "HEAD",
        ];
        let diff = match self.git.run(&args).await {
            Ok(diff) => diff,
            Err(e) => {
                debug!("{} failed: {e}", Strategy::FullDiff);
                return None;
            }
        };
        if diff.trim().is_empty() {
            debug!("{} is empty", Strategy::FullDiff);
            return None;
        }

        Some(ChangeSet {
            files: extract_paths(&diff),
            diff,
        })
    }

    /// Name-only comparison, filtered and enriched with per-file diffs.
    async fn name_only(&self, strategy: Strategy, args: &[&str]) -> Option<ChangeSet> {
        let out = match self.git.run(args).await {
            Ok(out) => out,
            Err(e) => {
                debug!("{strategy} failed: {e}");
                return None;
            }
        };

        let mut files: Vec<String> = Vec::new();
        for path in output_lines(&out).filter(|p| is_valid_path(p)) {
            if !files.iter().any(|f| f == path) {
                files.push(path.to_string());
            }
        }
        if files.is_empty() {
            debug!("{strategy} found no files");
            return None;
        }

        let diff = self.per_file_diffs(&files).await;
        Some(ChangeSet { files, diff })
    }

    /// Concatenate `HEAD^..HEAD` diffs of each file, skipping failures.
    async fn per_file_diffs(&self, files: &[String]) -> String {
        let mut parts = Vec::with_capacity(files.len());
        for file in files {
            let args = ["--no-pager", "diff", "--no-color", "HEAD^", "HEAD", "--", file.as_str()];
            match self.git.run(&args).await {
                Ok(diff) if !diff.trim().is_empty() => parts.push(diff),
                Ok(_) => {}
                Err(e) => debug!("could not diff {file}: {e}"),
            }
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::Git;
    use crate::diff::test_support::{ScriptedGit, commit_all, git, init_repo};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::time::Duration;

    const FULL_DIFF_CMD: &str = "--no-pager diff --no-color --find-renames --src-prefix=a/ --dst-prefix=b/ --unified=9999 HEAD^ HEAD";

    fn no_fetch() -> GitConfig {
        GitConfig {
            fetch: false,
            ..GitConfig::default()
        }
    }

    fn detector(fake: &Arc<ScriptedGit>, config: &GitConfig) -> ChangeDetector {
        ChangeDetector::new(Arc::clone(fake) as Arc<dyn GitRunner>, config)
    }

    fn in_work_tree() -> ScriptedGit {
        ScriptedGit::new().on("rev-parse --is-inside-work-tree", "true\n")
    }

    #[tokio::test]
    async fn full_diff_has_priority_over_remote_comparison() {
        let fake = Arc::new(
            in_work_tree()
                .on(FULL_DIFF_CMD, "diff --git a/a.txt b/a.txt\n@@ -1 +1 @@\n-a\n+b\n")
                .on("diff --name-only origin/main...HEAD", "other.rs\n"),
        );

        let changes = detector(&fake, &no_fetch()).detect().await;

        assert_eq!(changes.files, vec!["a.txt"]);
        assert!(changes.diff.contains("+b"));
        assert!(!fake.was_called("diff --name-only origin/main...HEAD"));
    }

    #[tokio::test]
    async fn strategies_run_in_fixed_order() {
        let fake = Arc::new(in_work_tree());
        let config = GitConfig {
            base_branch: Some("main".to_string()),
            ..no_fetch()
        };

        let changes = detector(&fake, &config).detect().await;
        assert!(changes.is_empty());

        let strategy_calls: Vec<String> = fake
            .calls()
            .into_iter()
            .filter(|c| c.contains("diff"))
            .collect();
        assert_eq!(
            strategy_calls,
            vec![
                FULL_DIFF_CMD.to_string(),
                "diff --name-only origin/main...HEAD".to_string(),
                "diff --name-only main...HEAD".to_string(),
                "diff --name-only".to_string(),
                "diff --name-only HEAD~1..HEAD".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn remote_comparison_filters_and_collects_per_file_diffs() {
        let fake = Arc::new(
            in_work_tree()
                .on("diff --name-only origin/main...HEAD", "src/a.rs\n.git/config\n\nsrc/b.rs\n")
                .on("--no-pager diff --no-color HEAD^ HEAD -- src/a.rs", "diff-a\n")
                .on("--no-pager diff --no-color HEAD^ HEAD -- src/b.rs", "diff-b\n"),
        );

        let changes = detector(&fake, &no_fetch()).detect().await;

        assert_eq!(changes.files, vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(changes.diff, "diff-a\n\ndiff-b\n");
        assert!(!fake.was_called("diff --name-only main...HEAD"));
    }

    #[tokio::test]
    async fn per_file_diff_failures_are_skipped() {
        let fake = Arc::new(
            in_work_tree()
                .on("diff --name-only", "new.rs\nold.rs\n")
                .on("--no-pager diff --no-color HEAD^ HEAD -- old.rs", "diff-old\n"),
        );
        let config = GitConfig {
            base_branch: Some("main".to_string()),
            ..no_fetch()
        };

        let changes = detector(&fake, &config).detect().await;

        assert_eq!(changes.files, vec!["new.rs", "old.rs"]);
        assert_eq!(changes.diff, "diff-old\n");
    }

    #[tokio::test]
    async fn name_only_result_of_only_invalid_paths_falls_through() {
        let fake = Arc::new(
            in_work_tree()
                .on("diff --name-only main...HEAD", ".DS_Store\n")
                .on("diff --name-only HEAD~1..HEAD", "lib.rs\n"),
        );
        let config = GitConfig {
            base_branch: Some("main".to_string()),
            ..no_fetch()
        };

        let changes = detector(&fake, &config).detect().await;
        assert_eq!(changes.files, vec!["lib.rs"]);
        assert_eq!(changes.diff, "");
    }

    #[tokio::test]
    async fn outside_work_tree_returns_empty_without_running_strategies() {
        let fake = Arc::new(ScriptedGit::new());

        let changes = detector(&fake, &GitConfig::default()).detect().await;

        assert_eq!(changes, ChangeSet::empty());
        assert_eq!(fake.calls(), vec!["rev-parse --is-inside-work-tree"]);
    }

    #[tokio::test]
    async fn guard_timeout_returns_empty_without_running_strategies() {
        let fake = Arc::new(ScriptedGit::new().stall("rev-parse --is-inside-work-tree"));

        let changes = detector(&fake, &GitConfig::default()).detect().await;

        assert_eq!(changes, ChangeSet::empty());
        assert_eq!(fake.calls(), vec!["rev-parse --is-inside-work-tree"]);
    }

    #[tokio::test]
    async fn strategy_timeout_falls_through_to_next_strategy() {
        let fake = Arc::new(
            in_work_tree()
                .stall("fetch origin")
                .stall(FULL_DIFF_CMD)
                .on("diff --name-only origin/main...HEAD", "src/lib.rs\n")
                .stall("--no-pager diff --no-color HEAD^ HEAD -- src/lib.rs"),
        );
        let config = GitConfig {
            base_branch: Some("main".to_string()),
            ..GitConfig::default()
        };

        let changes = detector(&fake, &config).detect().await;

        assert_eq!(changes.files, vec!["src/lib.rs"]);
        assert_eq!(changes.diff, "");
        assert!(fake.was_called("fetch origin"));
        assert!(!fake.was_called("diff --name-only main...HEAD"));
    }

    #[tokio::test]
    async fn explicit_base_branch_skips_detection() {
        let fake = Arc::new(in_work_tree().on("diff --name-only upstream/release...HEAD", "x.rs\n"));
        let config = GitConfig {
            remote: "upstream".to_string(),
            base_branch: Some("release".to_string()),
            fetch: false,
            ..GitConfig::default()
        };

        let changes = detector(&fake, &config).detect().await;

        assert_eq!(changes.files, vec!["x.rs"]);
        assert!(!fake.was_called("symbolic-ref refs/remotes/upstream/HEAD"));
    }

    #[tokio::test]
    async fn fetch_failure_is_not_fatal() {
        let fake = Arc::new(in_work_tree().on("diff --name-only", "dirty.rs\n"));

        let changes = detector(&fake, &GitConfig::default()).detect().await;

        assert!(fake.was_called("fetch origin"));
        assert_eq!(changes.files, vec!["dirty.rs"]);
    }

    // ── Real repositories ───────────────────────────────────────────

    fn real_detector(dir: &Path) -> ChangeDetector {
        let runner: Arc<dyn GitRunner> = Arc::new(Git::new(dir, Duration::from_secs(30)));
        ChangeDetector::new(runner, &GitConfig::default())
    }

    #[tokio::test]
    async fn commit_ahead_of_base_lists_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p);
        std::fs::write(p.join("a.txt"), "alpha\n").unwrap();
        std::fs::write(p.join("b.txt"), "beta\n").unwrap();
        commit_all(p, "base");
        git(p, &["checkout", "-b", "feature"]);
        std::fs::write(p.join("a.txt"), "alpha\nmore\n").unwrap();
        std::fs::write(p.join("b.txt"), "beta\nmore\n").unwrap();
        commit_all(p, "change both");

        let changes = real_detector(p).detect().await;

        assert_eq!(changes.files, vec!["a.txt", "b.txt"]);
        assert!(!changes.diff.is_empty());
        assert!(changes.diff.contains("+more"));
    }

    #[tokio::test]
    async fn clean_single_commit_repo_has_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p);
        std::fs::write(p.join("a.txt"), "alpha\n").unwrap();
        commit_all(p, "only commit");

        let changes = real_detector(p).detect().await;

        assert_eq!(changes, ChangeSet { files: vec![], diff: String::new() });
    }

    #[tokio::test]
    async fn non_repository_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loose.txt"), "x\n").unwrap();

        let changes = real_detector(dir.path()).detect().await;
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn uncommitted_changes_in_single_commit_repo() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p);
        std::fs::write(p.join("a.txt"), "alpha\n").unwrap();
        commit_all(p, "only commit");
        std::fs::write(p.join("a.txt"), "alpha\nedited\n").unwrap();

        let changes = real_detector(p).detect().await;

        assert_eq!(changes.files, vec!["a.txt"]);
        // No previous commit to diff against
        assert_eq!(changes.diff, "");
    }

    #[tokio::test]
    async fn renamed_file_appears_once() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        init_repo(p);
        std::fs::write(p.join("old.txt"), "line one\nline two\nline three\n").unwrap();
        commit_all(p, "add");
        git(p, &["mv", "old.txt", "new.txt"]);
        commit_all(p, "rename");

        let changes = real_detector(p).detect().await;

        assert_eq!(changes.files, vec!["new.txt"]);
    }
}
