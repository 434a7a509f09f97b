//! Configuration loading and layering.
//!
//! Handles `.codesentinel.toml` loading, environment variable resolution,
//! CLI flag merging with proper priority ordering, and the review prompt.

pub mod loader;
pub mod prompt;

pub use loader::{
    Config, ConfigError, EmailConfig, GitConfig, ProviderConfig, ReviewConfig, WebhookConfig,
};
