//! Chat notification channels for daily digests.
//!
//! This crate delivers an already-rendered digest to a chat channel. Long
//! digests are split at record boundaries so each physical message fits the
//! channel's size limit.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{build_channel, ChannelKind, NotifyChannel, NotifyConfig};
//!
//! # async fn run() {
//! let config = NotifyConfig::from_env();
//! let channel = build_channel(ChannelKind::Telegram, &config, "AI-Scholar-Daily");
//!
//! let delivered = channel.send_long("header\n---\nfirst paper\n---\nsecond paper").await;
//! # let _ = delivered;
//! # }
//! ```
//!
//! # Configuration
//!
//! Channels are configured via environment variables, read once by
//! [`NotifyConfig::from_env`]:
//!
//! - `NOTIFY_CHANNEL`: `telegram`, `whatsapp`, `openclaw`, `serverchan` or `both`
//! - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`
//! - `WHATSAPP_TOKEN`, `WHATSAPP_PHONE_NUMBER_ID`, `WHATSAPP_TO`
//! - `OPENCLAW_BIN`, `OPENCLAW_CHANNEL`, `OPENCLAW_TARGET`
//! - `SERVERCHAN_SENDKEY`
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`TelegramChannel`], [`WhatsAppChannel`], [`OpenClawChannel`] and
//!   [`ServerChanChannel`] implement it
//! - [`build_channel`] maps a [`ChannelKind`] to its implementation
//! - [`segment`] splits long messages on the `---` record separator

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod config;
pub mod error;
pub mod segment;

pub use channels::{
    build_channel, NotifyChannel, OpenClawChannel, ServerChanChannel, TelegramChannel,
    WhatsAppChannel,
};
pub use config::{
    ChannelKind, ChannelSelection, MessageStyle, NotifyConfig, OpenClawConfig, ServerChanConfig,
    TelegramConfig, WhatsAppConfig,
};
pub use error::{ChannelError, ConfigError};
pub use segment::{message_len, segment, SECTION_DELIMITER};
