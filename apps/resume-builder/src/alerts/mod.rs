//! Job-alert subscribe/unsubscribe forms.
//!
//! Email validation runs before any network call. Backend failures end up
//! in the form's message, never as an error to the caller.

pub mod handlers;

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api_client::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeRequest {
    /// Token from the link in an alert email.
    Token(String),
    Email(String),
}

/// Backend calls behind the alert forms. Both return the server's optional message.
#[async_trait]
pub trait AlertBackend: Send + Sync {
    async fn subscribe(&self, email: &str, category_id: i64) -> ApiResult<Option<String>>;

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> ApiResult<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Success,
    Error,
    #[default]
    Info,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Returns the normalized (trimmed, lowercased) email or the message to show.
pub fn validate_email(email: &str) -> Result<String, &'static str> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err("Please enter your email address");
    }
    if !email_regex().is_match(trimmed) {
        return Err("Please enter a valid email address");
    }
    Ok(trimmed.to_lowercase())
}

fn failure_message(err: &ApiError, fallback: &str) -> String {
    match err.server_message() {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => fallback.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Subscribe
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SubscribeForm {
    pub email: String,
    pub message: Option<String>,
    pub message_type: MessageType,
}

impl SubscribeForm {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub async fn submit(&mut self, backend: &dyn AlertBackend, category_id: i64) {
        let email = match validate_email(&self.email) {
            Ok(email) => email,
            Err(message) => return self.show(MessageType::Error, message.to_string()),
        };
        self.message = None;

        match backend.subscribe(&email, category_id).await {
            Ok(message) => {
                info!("Subscribed {email} to category {category_id}");
                self.email.clear();
                self.show(
                    MessageType::Success,
                    message.unwrap_or_else(|| {
                        "Successfully subscribed! Check your email for confirmation.".to_string()
                    }),
                );
            }
            Err(e) => {
                warn!("Job alert subscription failed: {e}");
                self.show(
                    MessageType::Error,
                    failure_message(&e, "An error occurred. Please try again later."),
                );
            }
        }
    }

    fn show(&mut self, message_type: MessageType, message: String) {
        self.message_type = message_type;
        self.message = Some(message);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Unsubscribe
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UnsubscribeForm {
    pub email: String,
    pub message: Option<String>,
    pub message_type: MessageType,
    pub has_unsubscribed: bool,
}

impl UnsubscribeForm {
    /// Unsubscribes with the emailed token. An empty token does nothing.
    pub async fn submit_token(&mut self, backend: &dyn AlertBackend, token: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        self.message = None;

        let request = UnsubscribeRequest::Token(token.to_string());
        match backend.unsubscribe(&request).await {
            Ok(message) => self.succeed(
                message.unwrap_or_else(|| "Successfully unsubscribed from job alerts.".to_string()),
            ),
            Err(e) => {
                warn!("Token unsubscribe failed: {e}");
                self.fail(failure_message(
                    &e,
                    "An error occurred. Please try manually with your email.",
                ));
            }
        }
    }

    pub async fn submit_email(&mut self, backend: &dyn AlertBackend) {
        let email = match validate_email(&self.email) {
            Ok(email) => email,
            Err(message) => return self.fail(message.to_string()),
        };
        self.message = None;

        match backend.unsubscribe(&UnsubscribeRequest::Email(email)).await {
            Ok(message) => {
                self.email.clear();
                self.succeed(message.unwrap_or_else(|| {
                    "Successfully unsubscribed from all job alerts.".to_string()
                }));
            }
            Err(e) => {
                warn!("Email unsubscribe failed: {e}");
                self.fail(failure_message(&e, "An error occurred. Please try again later."));
            }
        }
    }

    fn succeed(&mut self, message: String) {
        self.message = Some(message);
        self.message_type = MessageType::Success;
        self.has_unsubscribed = true;
    }

    fn fail(&mut self, message: String) {
        self.message = Some(message);
        self.message_type = MessageType::Error;
    }
}
