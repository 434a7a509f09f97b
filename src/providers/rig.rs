//! rig-core integration for LLM-backed code review.
//!
//! Uses rig-core's provider clients and Agent abstraction. Gemini is
//! reached through its OpenAI-compatible endpoint; OpenAI, Anthropic and
//! any OpenAI-compatible API are also supported.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::constants::GEMINI_OPENAI_BASE_URL;
use crate::models::{FileContentMap, ProviderName, Review, ReviewFormat, ReviewReport};

use super::{ProviderError, ReviewProvider};

/// Maximum tokens per LLM completion response.
///
/// Set high enough to accommodate thinking models (e.g. Gemini 2.5 Pro)
/// that consume part of the budget for internal reasoning tokens.
const MAX_TOKENS: u64 = 65536;

/// Maximum length of LLM response text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

/// Build an agent from a rig-core client and prompt it once.
///
/// Structured replies declare the `ReviewReport` schema so providers that
/// support it constrain the output to that shape.
macro_rules! prompt_review {
    ($client:expr, $model:expr, $system:expr, $user:expr, $structured:expr, $label:expr) => {{
        let reply = if $structured {
            let agent = $client
                .agent($model)
                .preamble($system)
                .temperature(0.0)
                .max_tokens(MAX_TOKENS)
                .output_schema::<ReviewReport>()
                .build();
            agent.prompt($user).await
        } else {
            let agent = $client
                .agent($model)
                .preamble($system)
                .temperature(0.0)
                .max_tokens(MAX_TOKENS)
                .build();
            agent.prompt($user).await
        };
        reply.map_err(|e| ProviderError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// rig-core based review provider.
///
/// The provider name in config selects which rig-core client to use.
pub struct RigProvider {
    config: ProviderConfig,
    system_prompt: String,
    format: ReviewFormat,
}

impl RigProvider {
    /// Create a new RigProvider. Fails when the API key or model is missing.
    pub fn new(
        config: ProviderConfig,
        system_prompt: String,
        format: ReviewFormat,
    ) -> Result<Self, ProviderError> {
        if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var()
            )));
        }
        if config.model.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "no model configured for provider '{}'. Set {}.",
                config.name,
                crate::constants::ENV_MODEL
            )));
        }
        Ok(Self {
            config,
            system_prompt,
            format,
        })
    }

    /// Build an OpenAI-style client against `base_url`, or the OpenAI
    /// default when none is given.
    fn build_openai_client(
        &self,
        api_key: &str,
        base_url: Option<&str>,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(base_url) = base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, ProviderError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Get the API key or return an error.
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(&self, user_prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();
        let system_prompt = self.system_prompt.as_str();
        let structured = self.format == ReviewFormat::Structured;

        match self.config.name {
            ProviderName::Gemini => {
                let base_url = self
                    .config
                    .base_url
                    .as_deref()
                    .unwrap_or(GEMINI_OPENAI_BASE_URL);
                let client = self.build_openai_client(api_key, Some(base_url))?;
                prompt_review!(client, model, system_prompt, user_prompt, structured, "Gemini")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key, self.config.base_url.as_deref())?;
                prompt_review!(client, model, system_prompt, user_prompt, structured, "OpenAI")
            }
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_review!(client, model, system_prompt, user_prompt, structured, "Anthropic")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client = self.build_openai_client(api_key, Some(base_url))?;
                prompt_review!(
                    client,
                    model,
                    system_prompt,
                    user_prompt,
                    structured,
                    "OpenAI-compatible"
                )
            }
        }
    }
}

#[async_trait]
impl ReviewProvider for RigProvider {
    async fn review(&self, contents: &FileContentMap) -> Result<Review, ProviderError> {
        let user_prompt = build_user_prompt(contents)?;
        info!(
            "requesting review of {} file(s) from {} ({})",
            contents.len(),
            self.config.name,
            self.config.model
        );

        let response = self.call_rig(&user_prompt).await?;
        debug!("LLM replied with {} bytes", response.len());
        parse_review_response(&response, self.format)
    }
}

/// The user turn: the file content map as a JSON object.
fn build_user_prompt(contents: &FileContentMap) -> Result<String, ProviderError> {
    serde_json::to_string(contents)
        .map_err(|e| ProviderError::ParseError(format!("cannot serialize file contents: {e}")))
}

/// Parse the LLM response text into a review.
///
/// Raw replies are used as-is. Structured replies are expected to be a
/// `{"prTitle", "prDetails"}` object, but models regularly wrap it in
/// fences or prose, so several candidates are tried before giving up.
pub fn parse_review_response(response: &str, format: ReviewFormat) -> Result<Review, ProviderError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    if format == ReviewFormat::Raw {
        return Ok(Review::Raw(trimmed.to_string()));
    }

    for candidate in extract_json_candidates(trimmed) {
        if let Ok(report) = serde_json::from_str::<ReviewReport>(&candidate) {
            return Ok(Review::Structured(report));
        }
    }

    Err(ProviderError::ParseError(format!(
        "could not parse LLM response as review JSON. Response: {}",
        preview(response)
    )))
}

fn preview(response: &str) -> &str {
    let mut end = response.len().min(PARSE_ERROR_PREVIEW_LEN);
    while !response.is_char_boundary(end) {
        end -= 1;
    }
    &response[..end]
}

/// Content inside a markdown code fence with any (or no) language tag.
///
/// The closing fence must start a line so backticks inside JSON string
/// values do not end the match early.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n[ \t]*```").unwrap()
});

/// Fence markers stripped by the last-resort cleanup.
static LEGACY_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|js|ts|py|sh|html|css|bash|text|diff)?").unwrap()
});

/// Candidate JSON strings, most literal first:
/// the text itself, each fenced block, the outermost `{...}` slice, and
/// finally the text with fence markers removed and newlines collapsed.
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = vec![text.to_string()];

    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                candidates.push(inner.to_string());
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(text[start..=end].to_string());
        }
    }

    candidates.push(clean_response_string(text));
    candidates
}

/// Strip fence markers and fold line breaks so literal newlines inside
/// string values no longer break JSON parsing.
fn clean_response_string(text: &str) -> String {
    let stripped = LEGACY_FENCE_RE.replace_all(text, "");
    stripped
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}
