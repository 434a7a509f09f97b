//! Review delivery: the markdown file on disk plus optional email and
//! webhook notifications.

pub mod email;
pub mod webhook;
pub mod writer;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;
pub use writer::{review_file_name, write_review};

/// Errors from notification channels.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("email error: {0}")]
    Email(String),

    #[error("webhook error: {0}")]
    Webhook(String),
}

/// A channel the finished review is announced on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name used in logs.
    fn name(&self) -> &'static str;

    /// Deliver the review markdown.
    async fn send(&self, review_markdown: &str) -> Result<(), NotifyError>;
}

/// Notifiers enabled by the configuration: email when recipients are set,
/// webhook when a URL is set.
pub fn build_notifiers(config: &Config) -> Result<Vec<Arc<dyn Notifier>>, NotifyError> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if config.email.is_enabled() {
        notifiers.push(Arc::new(EmailNotifier::new(&config.email)?));
    }

    if let Some(url) = config.webhook.url.as_deref().map(str::trim) {
        if !url.is_empty() {
            notifiers.push(Arc::new(WebhookNotifier::new(url)?));
        }
    }

    Ok(notifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_configured_means_no_notifiers() {
        let notifiers = build_notifiers(&Config::default()).unwrap();
        assert!(notifiers.is_empty());
    }

    #[test]
    fn recipients_enable_email() {
        let mut config = Config::default();
        config.email.recipients = Some("dev@example.com".to_string());
        config.email.username = Some("bot@example.com".to_string());
        config.email.password = Some("secret".to_string());

        let names: Vec<_> = build_notifiers(&config)
            .unwrap()
            .iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(names, vec!["email"]);
    }

    #[test]
    fn webhook_url_enables_webhook() {
        let mut config = Config::default();
        config.webhook.url = Some("https://chat.example.com/hook".to_string());

        let names: Vec<_> = build_notifiers(&config)
            .unwrap()
            .iter()
            .map(|n| n.name())
            .collect();
        assert_eq!(names, vec!["webhook"]);
    }

    #[test]
    fn blank_webhook_url_is_ignored() {
        let mut config = Config::default();
        config.webhook.url = Some("   ".to_string());
        assert!(build_notifiers(&config).unwrap().is_empty());
    }
}
