//! Shared types used across all modules.
//!
//! Change sets, review results, and the small enums that select provider
//! and output policy live here so other modules never reach into each
//! other's internals.

pub mod change;
pub mod review;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use change::{ChangeSet, FileContentMap};
pub use review::{Review, ReviewReport};

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    /// Google Gemini, reached through its OpenAI-compatible endpoint.
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::Gemini => write!(f, "gemini"),
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Anthropic => write!(f, "anthropic"),
            ProviderName::OpenAICompatible => write!(f, "openai-compatible"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderName::Gemini),
            "openai" => Ok(ProviderName::OpenAI),
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: gemini, openai, anthropic, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Provider-specific environment variable consulted for the API key
    /// when `CODESENTINEL_API_KEY` is not set.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Shape of the reply requested from the LLM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFormat {
    /// JSON `{"prTitle", "prDetails"}` reply.
    #[default]
    Structured,
    /// Free-form markdown used verbatim.
    Raw,
}

/// How review artifact file names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingPolicy {
    /// Derived from the review title, e.g. `Fix_login_bug.md`.
    #[default]
    Title,
    /// `review_<date>_<epoch-ms>.md`.
    Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_name_display_and_parse_agree() {
        for name in [
            ProviderName::Gemini,
            ProviderName::OpenAI,
            ProviderName::Anthropic,
            ProviderName::OpenAICompatible,
        ] {
            assert_eq!(name.to_string().parse::<ProviderName>().unwrap(), name);
        }
    }

    #[test]
    fn provider_name_from_str_case_insensitive() {
        assert_eq!("GEMINI".parse::<ProviderName>().unwrap(), ProviderName::Gemini);
        assert_eq!("OpenAI".parse::<ProviderName>().unwrap(), ProviderName::OpenAI);
    }

    #[test]
    fn provider_name_from_str_invalid() {
        let err = "cohere".parse::<ProviderName>().unwrap_err();
        assert!(err.contains("unsupported provider"));
        assert!(err.contains("cohere"));
    }

    #[test]
    fn provider_name_serde_uses_kebab_names() {
        let json = serde_json::to_string(&ProviderName::OpenAICompatible).unwrap();
        assert_eq!(json, "\"openai-compatible\"");
        let back: ProviderName = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(back, ProviderName::Gemini);
    }

    #[test]
    fn provider_api_key_env_vars() {
        assert_eq!(ProviderName::Gemini.api_key_env_var(), "GEMINI_API_KEY");
        assert_eq!(ProviderName::OpenAICompatible.api_key_env_var(), "OPENAI_API_KEY");
    }

    #[test]
    fn policy_defaults() {
        assert_eq!(ReviewFormat::default(), ReviewFormat::Structured);
        assert_eq!(NamingPolicy::default(), NamingPolicy::Title);
    }
}
