//! Slack chat delivery with webhook fallback.
//!
//! [`SlackDelivery`] sends a composed [`SlackMessage`] through one of two
//! paths: the token-authenticated `chat.postMessage` API when a bot token is
//! configured, or a legacy incoming webhook otherwise. Which path applies is
//! decided by [`SlackPlan::from_settings`], a pure function over the
//! settings blob, so the fallback logic is testable without any network.
//!
//! Sends are single-shot; a failed delivery is logged by the caller and
//! never retried.

use std::time::Duration;

use kongwatch_core::settings::{
    SettingsData, DEFAULT_SLACK_CHANNEL, FIELD_SLACK_BOT_TOKEN, FIELD_SLACK_CHANNEL,
    FIELD_SLACK_WEBHOOK_URL, INTEGRATION_SLACK,
};
use serde::{Deserialize, Serialize};

use crate::compose::{Block, SlackMessage};

/// Slack Web API endpoint for posting messages.
const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sidebar color of the single attachment the webhook path wraps the blocks
/// in.
const ATTACHMENT_COLOR: &str = "#36a64f";

/// Top-level text used when a message has none of its own.
const WEBHOOK_FALLBACK_TEXT: &str = "Notificação do Kongwatch";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Slack delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Slack returned HTTP {0}")]
    HttpStatus(u16),

    /// The Web API answered 200 but reported `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),
}

// ---------------------------------------------------------------------------
// Delivery plan
// ---------------------------------------------------------------------------

/// How a message should be delivered, decided from the settings blob alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackPlan<'a> {
    /// Integration absent or switched off; nothing is sent.
    Disabled,
    /// Bot token configured: post via the rich `chat.postMessage` API.
    Api { token: &'a str, channel: &'a str },
    /// No bot token, webhook URL configured: post the attachment form.
    Webhook { url: &'a str },
    /// Integration enabled but neither token nor webhook URL usable.
    Unconfigured,
}

impl<'a> SlackPlan<'a> {
    /// Evaluate the two-tier fallback against the settings blob.
    ///
    /// The rich API wins whenever a bot token is present; the webhook is
    /// only a fallback. Empty field values count as unset.
    pub fn from_settings(settings: &'a SettingsData) -> Self {
        let Some(integration) = settings.integration(INTEGRATION_SLACK) else {
            return Self::Disabled;
        };
        let config = &integration.config;
        if !config.enabled {
            return Self::Disabled;
        }

        if let Some(token) = config.field(FIELD_SLACK_BOT_TOKEN) {
            return Self::Api {
                token,
                channel: config
                    .field(FIELD_SLACK_CHANNEL)
                    .unwrap_or(DEFAULT_SLACK_CHANNEL),
            };
        }

        match config.field(FIELD_SLACK_WEBHOOK_URL) {
            Some(url) => Self::Webhook { url },
            None => Self::Unconfigured,
        }
    }
}

/// What a send attempt actually did. Returned for logging and assertions;
/// every variant except an `Err` from the HTTP layer is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlackOutcome {
    Disabled,
    Unconfigured,
    ApiSent,
    WebhookSent,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// `chat.postMessage` request body: the composed message plus the channel
/// merged in.
#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Block],
}

/// The subset of the `chat.postMessage` response the sender inspects.
#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Incoming-webhook payload: blocks wrapped in a single colored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: String,
    pub blocks: Vec<Block>,
}

/// Convert a block-kit message into the webhook attachment envelope.
///
/// The whole block sequence rides inside exactly one attachment, preserving
/// field order; the summary text is kept as the top-level text.
pub fn to_webhook_payload(message: &SlackMessage) -> WebhookPayload {
    let text = if message.text.is_empty() {
        WEBHOOK_FALLBACK_TEXT.to_string()
    } else {
        message.text.clone()
    };

    WebhookPayload {
        text,
        attachments: vec![Attachment {
            color: ATTACHMENT_COLOR.to_string(),
            blocks: message.blocks.clone(),
        }],
    }
}

// ---------------------------------------------------------------------------
// SlackDelivery
// ---------------------------------------------------------------------------

/// Delivers route alerts to Slack.
#[derive(Clone)]
pub struct SlackDelivery {
    client: reqwest::Client,
}

impl SlackDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client }
    }

    /// Send a composed message according to the configured plan.
    ///
    /// Policy no-ops (integration disabled, nothing configured) come back as
    /// an `Ok` outcome; only transport and API failures are errors.
    pub async fn send(
        &self,
        settings: &SettingsData,
        message: &SlackMessage,
    ) -> Result<SlackOutcome, SlackError> {
        match SlackPlan::from_settings(settings) {
            SlackPlan::Disabled => {
                tracing::debug!("Slack integration missing or disabled, skipping chat leg");
                Ok(SlackOutcome::Disabled)
            }
            SlackPlan::Api { token, channel } => {
                self.post_message(token, channel, message).await?;
                tracing::info!(channel, "Slack notification sent via chat.postMessage");
                Ok(SlackOutcome::ApiSent)
            }
            SlackPlan::Webhook { url } => {
                tracing::info!("Slack bot token not configured, falling back to webhook");
                self.post_webhook(url, &to_webhook_payload(message)).await?;
                tracing::info!("Slack notification sent via webhook");
                Ok(SlackOutcome::WebhookSent)
            }
            SlackPlan::Unconfigured => {
                tracing::warn!("Slack webhook URL not configured, dropping notification");
                Ok(SlackOutcome::Unconfigured)
            }
        }
    }

    /// Execute one `chat.postMessage` call and check both the HTTP status
    /// and the API-level `ok` flag.
    async fn post_message(
        &self,
        token: &str,
        channel: &str,
        message: &SlackMessage,
    ) -> Result<(), SlackError> {
        let request = PostMessageRequest {
            channel,
            text: &message.text,
            blocks: &message.blocks,
        };

        let response = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SlackError::HttpStatus(response.status().as_u16()));
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }

    /// Execute a single webhook POST and check the response status.
    async fn post_webhook(&self, url: &str, payload: &WebhookPayload) -> Result<(), SlackError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(SlackError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl Default for SlackDelivery {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
