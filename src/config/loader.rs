//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (applied by the binary after loading)
//! 2. Environment variables
//! 3. `.codesentinel.toml` in repo root
//! 4. `~/.config/codesentinel/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::{NamingPolicy, ProviderName, ReviewFormat};

/// Errors during config loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("missing required setting {setting} (set {hint})")]
    Missing {
        setting: &'static str,
        hint: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub review: ReviewConfig,
    pub git: GitConfig,
    pub email: EmailConfig,
    pub webhook: WebhookConfig,
}

/// LLM provider configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Review prompt and artifact settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Directory receiving review files; relative paths resolve against the repo root.
    pub output_dir: PathBuf,
    /// Text file holding the system prompt. The built-in prompt is used when unset.
    pub prompt_file: Option<PathBuf>,
    pub format: ReviewFormat,
    pub naming: NamingPolicy,
    /// Write the change set and file contents next to the review before the LLM call.
    pub debug_dump: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            prompt_file: None,
            format: ReviewFormat::default(),
            naming: NamingPolicy::default(),
            debug_dump: false,
        }
    }
}

impl ReviewConfig {
    /// Output directory, with a relative path taken from `repo_root`.
    pub fn output_dir_in(&self, repo_root: &Path) -> PathBuf {
        resolve_against(repo_root, &self.output_dir)
    }

    /// Prompt file, with a relative path taken from `repo_root`.
    pub fn prompt_file_in(&self, repo_root: &Path) -> Option<PathBuf> {
        self.prompt_file
            .as_deref()
            .map(|path| resolve_against(repo_root, path))
    }
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub remote: String,
    /// Explicit base branch; auto-detected when unset.
    pub base_branch: Option<String>,
    /// Refresh remote-tracking refs before comparing.
    pub fetch: bool,
    pub timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: constants::DEFAULT_REMOTE.to_string(),
            base_branch: None,
            fetch: true,
            timeout_secs: constants::DEFAULT_GIT_TIMEOUT.as_secs(),
        }
    }
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// SMTP delivery settings. Email is sent only when recipients are configured.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Comma-separated recipient list.
    pub recipients: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: constants::DEFAULT_SMTP_HOST.to_string(),
            username: None,
            password: None,
            recipients: None,
        }
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl EmailConfig {
    /// Trimmed, non-empty recipient addresses.
    pub fn recipient_list(&self) -> Vec<String> {
        self.recipients
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_enabled(&self) -> bool {
        !self.recipient_list().is_empty()
    }
}

/// Chat webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: Option<String>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        // Provider settings
        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if !other.provider.model.is_empty() {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }

        // Review settings
        let default_review = ReviewConfig::default();
        if other.review.output_dir != default_review.output_dir {
            self.review.output_dir = other.review.output_dir;
        }
        if other.review.prompt_file.is_some() {
            self.review.prompt_file = other.review.prompt_file;
        }
        if other.review.format != default_review.format {
            self.review.format = other.review.format;
        }
        if other.review.naming != default_review.naming {
            self.review.naming = other.review.naming;
        }
        if other.review.debug_dump {
            self.review.debug_dump = true;
        }

        // Git settings (disabled fetch overrides enabled)
        let default_git = GitConfig::default();
        if other.git.remote != default_git.remote {
            self.git.remote = other.git.remote;
        }
        if other.git.base_branch.is_some() {
            self.git.base_branch = other.git.base_branch;
        }
        if !other.git.fetch {
            self.git.fetch = false;
        }
        if other.git.timeout_secs != default_git.timeout_secs {
            self.git.timeout_secs = other.git.timeout_secs;
        }

        // Email settings
        if other.email.smtp_host != EmailConfig::default().smtp_host {
            self.email.smtp_host = other.email.smtp_host;
        }
        if other.email.username.is_some() {
            self.email.username = other.email.username;
        }
        if other.email.password.is_some() {
            self.email.password = other.email.password;
        }
        if other.email.recipients.is_some() {
            self.email.recipients = other.email.recipients;
        }

        // Webhook settings
        if other.webhook.url.is_some() {
            self.webhook.url = other.webhook.url;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(constants::ENV_PROVIDER) {
            match val.parse::<ProviderName>() {
                Ok(name) => self.provider.name = name,
                Err(_) => tracing::warn!("ignoring invalid {} value: {val}", constants::ENV_PROVIDER),
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .non_empty(constants::ENV_API_KEY)
            .or_else(|| env.non_empty(self.provider.name.api_key_env_var()));
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Some(val) = env.non_empty(constants::ENV_OUTPUT_DIR) {
            self.review.output_dir = PathBuf::from(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_PROMPT_FILE) {
            self.review.prompt_file = Some(PathBuf::from(val));
        }

        if let Some(val) = env.non_empty(constants::ENV_SMTP_HOST) {
            self.email.smtp_host = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_SMTP_USER) {
            self.email.username = Some(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_SMTP_PASSWORD) {
            self.email.password = Some(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_MAIL_RECIPIENTS) {
            self.email.recipients = Some(val);
        }

        if let Some(val) = env.non_empty(constants::ENV_WEBHOOK_URL) {
            self.webhook.url = Some(val);
        }
    }

    /// Check the settings a review run cannot start without.
    ///
    /// The API key and model are always required. Email delivery is
    /// optional, but once recipients are configured the SMTP credentials
    /// must be present too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::Missing {
                setting: "provider.api_key",
                hint: format!(
                    "{} or {}",
                    constants::ENV_API_KEY,
                    self.provider.name.api_key_env_var()
                ),
            });
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "provider.model",
                hint: constants::ENV_MODEL.to_string(),
            });
        }
        if self.email.is_enabled() {
            if self.email.username.is_none() {
                return Err(ConfigError::Missing {
                    setting: "email.username",
                    hint: constants::ENV_SMTP_USER.to_string(),
                });
            }
            if self.email.password.is_none() {
                return Err(ConfigError::Missing {
                    setting: "email.password",
                    hint: constants::ENV_SMTP_PASSWORD.to_string(),
                });
            }
        }
        Ok(())
    }
}
