//! OpenClaw local push helper channel.
//!
//! Delivery is delegated to the `openclaw` command-line tool, which forwards
//! the message to whatever chat channel it has been paired with.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::NotifyChannel;
use crate::config::OpenClawConfig;
use crate::error::ChannelError;

/// Messages longer than this are split before being handed to the helper.
pub const OPENCLAW_MAX_MESSAGE_LEN: usize = 4000;

/// How long the helper may run before it is killed.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenClaw command-line notification channel.
pub struct OpenClawChannel {
    config: OpenClawConfig,
    timeout: Duration,
}

impl OpenClawChannel {
    /// Create an OpenClaw channel from its configuration.
    #[must_use]
    pub const fn new(config: OpenClawConfig) -> Self {
        Self {
            config,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set how long the helper may run.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments passed to the helper for one message.
    fn args<'a>(&'a self, text: &'a str) -> Vec<&'a str> {
        let mut args = vec![
            "message",
            "send",
            "--channel",
            self.config.channel.as_str(),
            "--message",
            text,
        ];
        if let Some(target) = self.config.target.as_deref() {
            args.extend(["--target", target]);
        }
        args
    }
}

#[async_trait]
impl NotifyChannel for OpenClawChannel {
    fn name(&self) -> &'static str {
        "openclaw"
    }

    fn enabled(&self) -> bool {
        !self.config.bin.is_empty() && !self.config.channel.is_empty()
    }

    fn max_message_len(&self) -> usize {
        OPENCLAW_MAX_MESSAGE_LEN
    }

    async fn deliver(&self, text: &str) -> Result<(), ChannelError> {
        if !self.enabled() {
            return Err(ChannelError::NotConfigured("OPENCLAW_CHANNEL".to_string()));
        }

        debug!(
            channel = "openclaw",
            bin = %self.config.bin,
            target_channel = %self.config.channel,
            "Invoking push helper"
        );

        let child = Command::new(&self.config.bin)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ChannelError::HelperMissing(self.config.bin.clone())
                } else {
                    ChannelError::Io(e)
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ChannelError::Timeout(self.timeout))??;

        if output.status.success() {
            Ok(())
        } else {
            Err(ChannelError::HelperFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
