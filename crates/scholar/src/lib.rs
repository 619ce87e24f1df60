//! Daily research digest dispatcher.
//!
//! This crate provides:
//! - Summary record types handed over by the fetch/summarize stage
//! - Digest rendering for Telegram MarkdownV2 and plain-text channels
//! - An optional LLM-written overview paragraph
//! - Dispatch to the channels selected by `NOTIFY_CHANNEL`

pub mod ai;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod records;

// Re-export main types
pub use config::{LlmConfig, Settings};
pub use digest::{escape_markdown, DigestGenerator, LlmOverview, OverviewSource};
pub use dispatch::{ChannelOutcome, DispatchReport, Dispatcher};
pub use records::{load_records, DigestKind, PaperSummary, ProjectSummary, SummaryRecord};
