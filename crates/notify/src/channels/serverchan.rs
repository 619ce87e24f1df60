//! ServerChan push-to-mobile notification channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_body, NotifyChannel};
use crate::config::ServerChanConfig;
use crate::error::ChannelError;

/// Default ServerChan Turbo endpoint.
const SERVERCHAN_API_BASE: &str = "https://sctapi.ftqq.com";

/// Largest `desp` body accepted by the gateway.
pub const SERVERCHAN_MAX_MESSAGE_LEN: usize = 64_000;

/// Request timeout for the gateway.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// ServerChan notification channel.
pub struct ServerChanChannel {
    config: ServerChanConfig,
    title: String,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ServerChanChannel {
    /// Create a ServerChan channel; every push carries `title`.
    #[must_use]
    pub fn new(config: ServerChanConfig, title: String) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| SERVERCHAN_API_BASE.to_string());

        Self {
            config,
            title,
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
            "{}/{}.send",
            self.api_base.trim_end_matches('/'),
            self.config.send_key
        )
    }
}

#[async_trait]
impl NotifyChannel for ServerChanChannel {
    fn name(&self) -> &'static str {
        "serverchan"
    }

    fn enabled(&self) -> bool {
        !self.config.send_key.is_empty()
    }

    fn max_message_len(&self) -> usize {
        SERVERCHAN_MAX_MESSAGE_LEN
    }

    async fn deliver(&self, text: &str) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured("SERVERCHAN_SENDKEY".to_string()));
        }

        let form = PushForm {
            title: &self.title,
            desp: text,
        };

        debug!(channel = "serverchan", title = %self.title, "Sending message");

        let response = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status {
                channel: "serverchan",
                status,
                body: error_body(response).await,
            });
        }

        let body: ServerChanResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::from_request(e, self.timeout))?;

        match body.code {
            Some(0) => Ok(()),
            code => Err(ChannelError::Api {
                channel: "serverchan",
                reason: format!(
                    "code {}: {}",
                    code.map_or_else(|| "missing".to_string(), |c| c.to_string()),
                    body.message.unwrap_or_default()
                ),
            }),
        }
    }
}

// =============================================================================
// ServerChan API types
// =============================================================================

#[derive(Debug, Serialize)]
struct PushForm<'a> {
    title: &'a str,
    desp: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServerChanResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}
