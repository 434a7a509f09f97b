//! Base branch resolution.
//!
//! Tries, in order:
//! 1. `git symbolic-ref refs/remotes/<remote>/HEAD`
//! 2. The `HEAD branch:` line of `git remote show <remote>`
//! 3. The first of `main`, `master`, `trunk`, `develop` that exists as a
//!    remote-tracking ref
//! 4. `main`
//!
//! Resolution is total: every failure falls through to the next strategy.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::git::GitRunner;
use crate::constants::{CANDIDATE_BRANCHES, FALLBACK_BRANCH};

static HEAD_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)HEAD branch:\s*(\S+)").unwrap());

/// Determine the repository's default branch name. Never fails.
pub async fn resolve_default_branch(git: &dyn GitRunner, remote: &str) -> String {
    if let Some(branch) = from_symbolic_ref(git, remote).await {
        return branch;
    }
    if let Some(branch) = from_remote_show(git, remote).await {
        return branch;
    }
    if let Some(branch) = from_candidates(git, remote).await {
        return branch;
    }

    debug!("no default branch detected, falling back to {FALLBACK_BRANCH}");
    FALLBACK_BRANCH.to_string()
}

async fn from_symbolic_ref(git: &dyn GitRunner, remote: &str) -> Option<String> {
    let head_ref = format!("refs/remotes/{remote}/HEAD");
    match git.run(&["symbolic-ref", head_ref.as_str()]).await {
        Ok(out) => {
            let prefix = format!("refs/remotes/{remote}/");
            let branch = out.trim();
            let branch = branch.strip_prefix(&prefix).unwrap_or(branch);
            if branch.is_empty() {
                None
            } else {
                debug!("default branch {branch} from {head_ref}");
                Some(branch.to_string())
            }
        }
        Err(e) => {
            debug!("symbolic-ref lookup failed: {e}");
            None
        }
    }
}

async fn from_remote_show(git: &dyn GitRunner, remote: &str) -> Option<String> {
    match git.run(&["remote", "show", remote]).await {
        Ok(out) => {
            let branch = parse_head_branch(&out);
            match &branch {
                Some(b) => debug!("default branch {b} from `git remote show {remote}`"),
                None => debug!("`git remote show {remote}` reported no HEAD branch"),
            }
            branch
        }
        Err(e) => {
            debug!("remote show failed: {e}");
            None
        }
    }
}

async fn from_candidates(git: &dyn GitRunner, remote: &str) -> Option<String> {
    for candidate in CANDIDATE_BRANCHES {
        let tracking = format!("{remote}/{candidate}");
        match git.run(&["rev-parse", "--verify", "--quiet", tracking.as_str()]).await {
            Ok(_) => {
                debug!("assuming default branch is {candidate}");
                return Some(candidate.to_string());
            }
            Err(e) => debug!("{tracking} does not verify: {e}"),
        }
    }
    None
}

/// Extract `X` from a `HEAD branch: X` line. `(unknown)` is not a branch.
fn parse_head_branch(remote_info: &str) -> Option<String> {
    HEAD_BRANCH_RE
        .captures(remote_info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|b| b != "(unknown)")
}
