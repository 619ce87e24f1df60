//! Channel selection and per-channel credentials.
//!
//! Configuration is read once at process start (see [`NotifyConfig::from_env`])
//! and handed to the channel constructors by value.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default selector when `NOTIFY_CHANNEL` is unset.
pub const DEFAULT_CHANNEL: &str = "telegram";

/// Default name of the OpenClaw command-line helper.
pub const DEFAULT_OPENCLAW_BIN: &str = "openclaw";

/// Rendering style a channel expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStyle {
    /// Telegram MarkdownV2 with escaped user text
    Rich,
    /// Plain text with explicit URLs
    Plain,
}

/// A concrete delivery transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Telegram,
    WhatsApp,
    OpenClaw,
    ServerChan,
}

impl ChannelKind {
    /// Get the selector name for this channel.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Telegram => "telegram",
            Self::WhatsApp => "whatsapp",
            Self::OpenClaw => "openclaw",
            Self::ServerChan => "serverchan",
        }
    }

    /// Get the rendering style this channel needs.
    #[must_use]
    pub const fn style(&self) -> MessageStyle {
        match self {
            Self::Telegram => MessageStyle::Rich,
            Self::WhatsApp | Self::OpenClaw | Self::ServerChan => MessageStyle::Plain,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The channels a run delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelection {
    One(ChannelKind),
    /// Telegram (rich) and WhatsApp (plain), each checked independently
    Both,
}

impl ChannelSelection {
    /// Channels covered by this selection, in delivery order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ChannelKind> {
        match self {
            Self::One(kind) => vec![*kind],
            Self::Both => vec![ChannelKind::Telegram, ChannelKind::WhatsApp],
        }
    }
}

impl FromStr for ChannelSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telegram" => Ok(Self::One(ChannelKind::Telegram)),
            "whatsapp" => Ok(Self::One(ChannelKind::WhatsApp)),
            "openclaw" => Ok(Self::One(ChannelKind::OpenClaw)),
            "serverchan" => Ok(Self::One(ChannelKind::ServerChan)),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::UnknownChannel(s.to_string())),
        }
    }
}

/// Telegram bot credentials.
#[derive(Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Override for `https://api.telegram.org`
    pub api_base: Option<String>,
}

/// WhatsApp Business Cloud API credentials.
#[derive(Clone, Default)]
pub struct WhatsAppConfig {
    pub access_token: String,
    pub phone_number_id: String,
    /// Recipient phone number in international format
    pub to: String,
    /// Override for `https://graph.facebook.com/v18.0`
    pub api_base: Option<String>,
}

/// Parameters for the local OpenClaw push helper.
#[derive(Debug, Clone)]
pub struct OpenClawConfig {
    /// Executable name or path
    pub bin: String,
    /// Channel the helper should push to (e.g. `whatsapp`)
    pub channel: String,
    /// Optional recipient understood by the helper
    pub target: Option<String>,
}

impl Default for OpenClawConfig {
    fn default() -> Self {
        Self {
            bin: DEFAULT_OPENCLAW_BIN.to_string(),
            channel: String::new(),
            target: None,
        }
    }
}

/// ServerChan push gateway key.
#[derive(Clone, Default)]
pub struct ServerChanConfig {
    pub send_key: String,
    /// Override for `https://sctapi.ftqq.com`
    pub api_base: Option<String>,
}

/// Notification configuration for one run.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Raw channel selector, validated at dispatch time
    pub channel: String,
    pub telegram: TelegramConfig,
    pub whatsapp: WhatsAppConfig,
    pub openclaw: OpenClawConfig,
    pub serverchan: ServerChanConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            telegram: TelegramConfig::default(),
            whatsapp: WhatsAppConfig::default(),
            openclaw: OpenClawConfig::default(),
            serverchan: ServerChanConfig::default(),
        }
    }
}

impl NotifyConfig {
    /// Create configuration from environment variables.
    ///
    /// Missing credentials are not an error here; they are reported per
    /// channel by [`NotifyConfig::missing_fields`] when the run dispatches.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            channel: get("NOTIFY_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            telegram: TelegramConfig {
                bot_token: get("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
                chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
                api_base: get("TELEGRAM_API_BASE"),
            },
            whatsapp: WhatsAppConfig {
                access_token: get("WHATSAPP_TOKEN").unwrap_or_default(),
                phone_number_id: get("WHATSAPP_PHONE_NUMBER_ID").unwrap_or_default(),
                to: get("WHATSAPP_TO").unwrap_or_default(),
                api_base: get("WHATSAPP_API_BASE"),
            },
            openclaw: OpenClawConfig {
                bin: get("OPENCLAW_BIN").unwrap_or_else(|| DEFAULT_OPENCLAW_BIN.to_string()),
                channel: get("OPENCLAW_CHANNEL").unwrap_or_default(),
                target: get("OPENCLAW_TARGET"),
            },
            serverchan: ServerChanConfig {
                send_key: get("SERVERCHAN_SENDKEY").unwrap_or_default(),
                api_base: get("SERVERCHAN_API_BASE"),
            },
        }
    }

    /// Parse the configured selector.
    pub fn selection(&self) -> Result<ChannelSelection, ConfigError> {
        self.channel.parse()
    }

    /// Environment variables of required fields that are empty for `kind`.
    #[must_use]
    pub fn missing_fields(&self, kind: ChannelKind) -> Vec<&'static str> {
        let required: Vec<(&'static str, &str)> = match kind {
            ChannelKind::Telegram => vec![
                ("TELEGRAM_BOT_TOKEN", self.telegram.bot_token.as_str()),
                ("TELEGRAM_CHAT_ID", self.telegram.chat_id.as_str()),
            ],
            ChannelKind::WhatsApp => vec![
                ("WHATSAPP_TOKEN", self.whatsapp.access_token.as_str()),
                ("WHATSAPP_PHONE_NUMBER_ID", self.whatsapp.phone_number_id.as_str()),
                ("WHATSAPP_TO", self.whatsapp.to.as_str()),
            ],
            ChannelKind::OpenClaw => vec![
                ("OPENCLAW_BIN", self.openclaw.bin.as_str()),
                ("OPENCLAW_CHANNEL", self.openclaw.channel.as_str()),
            ],
            ChannelKind::ServerChan => vec![("SERVERCHAN_SENDKEY", self.serverchan.send_key.as_str())],
        };

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Render a secret for debug output without revealing it.
fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("access_token", &redact(&self.access_token))
            .field("phone_number_id", &self.phone_number_id)
            .field("to", &self.to)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl fmt::Debug for ServerChanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerChanConfig")
            .field("send_key", &redact(&self.send_key))
            .field("api_base", &self.api_base)
            .finish()
    }
}
