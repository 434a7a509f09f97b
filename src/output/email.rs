//! Email notifications over authenticated SMTP.
//!
//! The review markdown is rendered to HTML and relayed through the
//! configured SMTP host using TLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pulldown_cmark::{Options, Parser, html};
use tracing::info;

use crate::config::EmailConfig;
use crate::constants::{APP_NAME, EMAIL_SUBJECT};

use super::{Notifier, NotifyError};

/// Sends the review as an HTML email.
pub struct EmailNotifier {
    smtp_host: String,
    username: String,
    password: String,
    recipients: Vec<String>,
}

impl EmailNotifier {
    /// Build from config. Credentials and at least one recipient are required.
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let username = config
            .username
            .clone()
            .ok_or_else(|| NotifyError::Email("SMTP username is not set".to_string()))?;
        let password = config
            .password
            .clone()
            .ok_or_else(|| NotifyError::Email("SMTP password is not set".to_string()))?;
        let recipients = config.recipient_list();
        if recipients.is_empty() {
            return Err(NotifyError::Email("no recipients configured".to_string()));
        }

        Ok(Self {
            smtp_host: config.smtp_host.clone(),
            username,
            password,
            recipients,
        })
    }

    /// Assemble the message without sending it.
    fn build_message(&self, review_markdown: &str) -> Result<Message, NotifyError> {
        let from = parse_mailbox(&format!("{APP_NAME} <{}>", self.username))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(EMAIL_SUBJECT)
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .body(markdown_to_html(review_markdown))
            .map_err(|e| NotifyError::Email(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, review_markdown: &str) -> Result<(), NotifyError> {
        let message = self.build_message(review_markdown)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_host)
            .map_err(|e| NotifyError::Email(format!("cannot reach {}: {e}", self.smtp_host)))?
            .credentials(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
            .build();

        mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Email(format!("SMTP send failed: {e}")))?;

        info!("review emailed to {}", self.recipients.join(", "));
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Render review markdown as an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
