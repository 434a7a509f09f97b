//! ReviewProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core to decouple the
//! codebase from the specific LLM library.

pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FileContentMap, Review};

/// Errors from the review provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM-backed code review.
///
/// Implementations own the system prompt and reply format; callers only
/// hand over the changed files.
#[async_trait]
pub trait ReviewProvider: Send + Sync {
    /// Review the given file contents and return the parsed reply.
    async fn review(&self, contents: &FileContentMap) -> Result<Review, ProviderError>;
}
