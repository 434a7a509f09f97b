//! Chat webhook notifications.
//!
//! Chat services cap message length, so the review is split into numbered
//! parts and each part is posted as its own message inside a code block.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::constants::{WEBHOOK_CHUNK_SIZE, WEBHOOK_TIMEOUT};

use super::{Notifier, NotifyError};

/// Posts the review to a webhook URL as `{"content": ...}` messages.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
    chunk_size: usize,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Webhook(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            client,
            chunk_size: WEBHOOK_CHUNK_SIZE,
        })
    }

    /// Override the per-message character limit.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    async fn post_chunk(&self, body: &serde_json::Value) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(format!("HTTP {status}: {text}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, review_markdown: &str) -> Result<(), NotifyError> {
        let chunks = chunk_text(&neutralize_fences(review_markdown), self.chunk_size);
        let total = chunks.len();
        let mut failed = 0;

        // Sequential, so parts arrive in order.
        for (i, chunk) in chunks.iter().enumerate() {
            let body = serde_json::json!({ "content": wrap_chunk(chunk, i + 1, total) });
            if let Err(e) = self.post_chunk(&body).await {
                warn!("webhook part {}/{total} failed: {e}", i + 1);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(NotifyError::Webhook(format!(
                "{failed} of {total} part(s) failed to post"
            )));
        }
        info!("review posted to webhook in {total} part(s)");
        Ok(())
    }
}

/// Swap triple backticks for look-alikes so the review cannot close the
/// code block each part is wrapped in.
pub fn neutralize_fences(text: &str) -> String {
    text.replace("```", "´´´")
}

fn wrap_chunk(chunk: &str, part: usize, total: usize) -> String {
    format!("**Code Review (part {part}/{total}):**\n```\n{chunk}\n```")
}

/// Split `text` into pieces of at most `size` characters.
///
/// Splits on char boundaries, never inside a code point. Empty text yields
/// no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|piece| piece.iter().collect())
        .collect()
}
