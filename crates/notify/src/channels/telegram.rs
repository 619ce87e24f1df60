//! Telegram bot notification channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_body, NotifyChannel};
use crate::config::TelegramConfig;
use crate::error::ChannelError;

/// Default Telegram Bot API endpoint.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram rejects messages longer than this.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Request timeout for the Bot API.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse mode matching the escaping done by the rich digest style.
const PARSE_MODE: &str = "MarkdownV2";

/// Telegram bot notification channel.
pub struct TelegramChannel {
    config: TelegramConfig,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl TelegramChannel {
    /// Create a Telegram channel from its configuration.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| TELEGRAM_API_BASE.to_string());

        Self {
            config,
            api_base,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom API base URL (useful for tests or a local Bot API server).
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
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl NotifyChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn enabled(&self) -> bool {
        !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn max_message_len(&self) -> usize {
        TELEGRAM_MAX_MESSAGE_LEN
    }

    async fn deliver(&self, text: &str) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured(
                "TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID".to_string(),
            ));
        }

        let wire_text = escape_separator_lines(text);
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: &wire_text,
            parse_mode: PARSE_MODE,
            disable_web_page_preview: true,
        };

        debug!(channel = "telegram", chat_id = %self.config.chat_id, "Sending message");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status {
                channel: "telegram",
                status,
                body: error_body(response).await,
            });
        }

        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        if body.ok {
            Ok(())
        } else {
            Err(ChannelError::Api {
                channel: "telegram",
                reason: body
                    .description
                    .unwrap_or_else(|| "ok=false without description".to_string()),
            })
        }
    }
}

/// Escape lines consisting solely of the `---` record separator.
///
/// MarkdownV2 reserves `-`; the separator stays literal in the digest so the
/// segmenter can find it, and is escaped only on the wire.
fn escape_separator_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| if line == "---" { r"\-\-\-" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Telegram Bot API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_separator_lines() {
        assert_eq!(
            escape_separator_lines("a\n\n---\n\nb"),
            "a\n\n\\-\\-\\-\n\nb"
        );
        assert_eq!(escape_separator_lines("a --- b"), "a --- b");
        assert_eq!(escape_separator_lines("----"), "----");
    }

    #[test]
    fn test_endpoint_uses_token() {
        let channel = TelegramChannel::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            api_base: None,
        })
        .with_api_base("http://localhost:8081/");

        assert_eq!(channel.endpoint(), "http://localhost:8081/bot123:abc/sendMessage");
    }

    #[test]
    fn test_enabled_requires_token_and_chat() {
        let channel = TelegramChannel::new(TelegramConfig {
            bot_token: "123:abc".to_string(),
            ..TelegramConfig::default()
        });
        assert!(!channel.enabled());
    }
}
