//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and fixed limits so a rename only requires changing this file.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "codesentinel";

/// Crate version, as reported by `codesentinel version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.codesentinel.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".codesentinel.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "codesentinel";

/// Default directory for review artifacts, relative to the repo root.
pub const DEFAULT_OUTPUT_DIR: &str = "reviews";

/// OpenAI-compatible endpoint for Gemini models.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";

// ── Git ─────────────────────────────────────────────────────────────

/// Remote consulted for the base branch and refreshed before detection.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch name used when no detection strategy yields one.
pub const FALLBACK_BRANCH: &str = "main";

/// Candidate base branches checked as remote-tracking refs, in order.
pub const CANDIDATE_BRANCHES: [&str; 4] = ["main", "master", "trunk", "develop"];

/// Default bound on every git invocation.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Context lines requested for the full commit diff.
pub const FULL_DIFF_CONTEXT: usize = 9999;

// ── Notifications ───────────────────────────────────────────────────

/// Default SMTP relay for email delivery.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Subject line of review emails.
pub const EMAIL_SUBJECT: &str = "Peer Review of Latest Commit";

/// Maximum characters of review text per webhook message.
///
/// Chat webhooks cap messages at 2000 characters; the remainder is
/// left for the part header and code fence wrapper.
pub const WEBHOOK_CHUNK_SIZE: usize = 1800;

/// Bound on each webhook POST.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "CODESENTINEL_PROVIDER";
pub const ENV_MODEL: &str = "CODESENTINEL_MODEL";
pub const ENV_API_KEY: &str = "CODESENTINEL_API_KEY";
pub const ENV_BASE_URL: &str = "CODESENTINEL_BASE_URL";
pub const ENV_OUTPUT_DIR: &str = "CODESENTINEL_OUTPUT_DIR";
pub const ENV_PROMPT_FILE: &str = "CODESENTINEL_PROMPT_FILE";
pub const ENV_SMTP_HOST: &str = "CODESENTINEL_SMTP_HOST";
pub const ENV_SMTP_USER: &str = "CODESENTINEL_SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "CODESENTINEL_SMTP_PASSWORD";
pub const ENV_MAIL_RECIPIENTS: &str = "CODESENTINEL_MAIL_RECIPIENTS";
pub const ENV_WEBHOOK_URL: &str = "CODESENTINEL_WEBHOOK_URL";
