//! Notification channel implementations.

pub mod openclaw;
pub mod serverchan;
pub mod telegram;
pub mod whatsapp;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::{ChannelKind, NotifyConfig};
use crate::error::ChannelError;
use crate::segment::{message_len, segment};

pub use openclaw::OpenClawChannel;
pub use serverchan::ServerChanChannel;
pub use telegram::TelegramChannel;
pub use whatsapp::WhatsAppChannel;

/// Trait for notification channels (Telegram, WhatsApp, etc.).
///
/// Implementations provide a single transport call in [`deliver`]; the
/// provided methods turn failures into `false` so that no error crosses the
/// channel boundary.
///
/// [`deliver`]: NotifyChannel::deliver
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Largest message, in characters, the transport accepts.
    fn max_message_len(&self) -> usize;

    /// Send one message through the transport.
    async fn deliver(&self, text: &str) -> Result<(), ChannelError>;

    /// Send one chunk, logging and swallowing any failure.
    async fn send(&self, chunk: &str) -> bool {
        let channel = self.name();

        if !self.enabled() {
            error!(channel, "Channel not configured, message dropped");
            return false;
        }

        match self.deliver(chunk).await {
            Ok(()) => {
                debug!(channel, chars = message_len(chunk), "Message sent");
                true
            }
            Err(e) => {
                error!(channel, error = %e, "Failed to send message");
                false
            }
        }
    }

    /// Send every chunk in order; true only if all of them were delivered.
    ///
    /// A failed chunk does not stop the remaining ones from being sent.
    async fn send_all(&self, chunks: &[String]) -> bool {
        let channel = self.name();
        let total = chunks.len();
        let mut delivered = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            if total > 1 {
                info!(channel, part = i + 1, total, "Sending message part");
            }
            if self.send(chunk).await {
                delivered += 1;
            }
        }

        if delivered < total {
            warn!(channel, delivered, total, "Some message parts failed");
        }

        delivered == total
    }

    /// Segment `text` at this channel's limit and send every chunk.
    async fn send_long(&self, text: &str) -> bool {
        let chunks = segment(text, self.max_message_len());
        self.send_all(&chunks).await
    }
}

/// Build the notifier for `kind` from the run's configuration.
///
/// `title` is used by channels that carry a subject line next to the body.
#[must_use]
pub fn build_channel(kind: ChannelKind, config: &NotifyConfig, title: &str) -> Box<dyn NotifyChannel> {
    match kind {
        ChannelKind::Telegram => Box::new(TelegramChannel::new(config.telegram.clone())),
        ChannelKind::WhatsApp => Box::new(WhatsAppChannel::new(config.whatsapp.clone())),
        ChannelKind::OpenClaw => Box::new(OpenClawChannel::new(config.openclaw.clone())),
        ChannelKind::ServerChan => Box::new(ServerChanChannel::new(
            config.serverchan.clone(),
            title.to_string(),
        )),
    }
}

/// Read a response body for diagnostics, capped so logs stay readable.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    const MAX_CHARS: usize = 500;

    let body = response.text().await.unwrap_or_default();
    if body.chars().count() <= MAX_CHARS {
        body
    } else {
        let truncated: String = body.chars().take(MAX_CHARS).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every delivery and fails the ones listed in `fail_on`.
    struct RecordingChannel {
        fail_on: Vec<usize>,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingChannel {
        fn new(fail_on: Vec<usize>) -> Self {
            Self {
                fail_on,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotifyChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn enabled(&self) -> bool {
            true
        }

        fn max_message_len(&self) -> usize {
            20
        }

        async fn deliver(&self, text: &str) -> Result<(), ChannelError> {
            let mut sent = self.sent.lock().unwrap();
            let index = sent.len();
            sent.push(text.to_string());
            if self.fail_on.contains(&index) {
                Err(ChannelError::Api {
                    channel: "recording",
                    reason: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn chunks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_send_all_success() {
        let channel = RecordingChannel::new(vec![]);
        assert!(channel.send_all(&chunks(&["one", "two"])).await);
        assert_eq!(*channel.sent.lock().unwrap(), chunks(&["one", "two"]));
    }

    #[tokio::test]
    async fn test_send_all_continues_past_failure() {
        let channel = RecordingChannel::new(vec![0]);
        assert!(!channel.send_all(&chunks(&["one", "two", "three"])).await);
        assert_eq!(channel.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_send_long_segments_in_order() {
        let channel = RecordingChannel::new(vec![]);
        let text = "aaaaaaaa\n---\nbbbbbbbb\n---\ncccccccc";

        assert!(channel.send_long(text).await);

        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent.join("\n---\n"), text);
    }
}
