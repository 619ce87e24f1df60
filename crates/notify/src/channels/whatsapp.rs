//! WhatsApp Business Cloud API notification channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_body, NotifyChannel};
use crate::config::WhatsAppConfig;
use crate::error::ChannelError;

/// Default Graph API endpoint.
const WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Maximum body length of a WhatsApp text message.
pub const WHATSAPP_MAX_MESSAGE_LEN: usize = 4096;

/// Request timeout for the Graph API.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// WhatsApp Business notification channel.
pub struct WhatsAppChannel {
    config: WhatsAppConfig,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    /// Create a WhatsApp channel from its configuration.
    #[must_use]
    pub fn new(config: WhatsAppConfig) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| WHATSAPP_API_BASE.to_string());

        Self {
            config,
            api_base,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom API base URL.
    #[must_use]
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.config.phone_number_id
        )
    }
}

#[async_trait]
impl NotifyChannel for WhatsAppChannel {
    fn name(&self) -> &'static str {
        "whatsapp"
    }

    fn enabled(&self) -> bool {
        !self.config.access_token.is_empty()
            && !self.config.phone_number_id.is_empty()
            && !self.config.to.is_empty()
    }

    fn max_message_len(&self) -> usize {
        WHATSAPP_MAX_MESSAGE_LEN
    }

    async fn deliver(&self, text: &str) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured(
                "WHATSAPP_TOKEN/WHATSAPP_PHONE_NUMBER_ID/WHATSAPP_TO".to_string(),
            ));
        }

        let payload = TextMessage {
            messaging_product: "whatsapp",
            to: &self.config.to,
            kind: "text",
            text: TextBody { body: text },
        };

        debug!(channel = "whatsapp", to = %self.config.to, "Sending message");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.access_token)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status {
                channel: "whatsapp",
                status,
                body: error_body(response).await,
            });
        }

        let body: WhatsAppResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        match body.messages {
            Some(_) => Ok(()),
            None => Err(ChannelError::Api {
                channel: "whatsapp",
                reason: body
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "response has no messages".to_string()),
            }),
        }
    }
}

// =============================================================================
// WhatsApp Cloud API types
// =============================================================================

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'a str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct WhatsAppResponse {
    #[serde(default)]
    messages: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<WhatsAppError>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppError {
    message: String,
}
