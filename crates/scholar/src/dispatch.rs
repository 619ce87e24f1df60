//! Dispatch orchestrator - renders the digest and hands it to each selected
//! channel.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use notify::{build_channel, message_len, segment, ChannelKind, MessageStyle, NotifyConfig};

use crate::digest::{DigestGenerator, OverviewSource};
use crate::records::{DigestKind, SummaryRecord};

/// What happened to one selected channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Every chunk was delivered.
    Delivered,
    /// At least one chunk failed.
    Failed,
    /// Not attempted because required configuration is missing.
    Skipped {
        /// Environment variables that were empty.
        missing: Vec<&'static str>,
    },
}

impl ChannelOutcome {
    /// Whether the channel was actually attempted.
    pub const fn attempted(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }
}

impl fmt::Display for ChannelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped { missing } => write!(f, "skipped (missing {})", missing.join(", ")),
        }
    }
}

/// Result of one dispatch run.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Per-channel outcomes in send order.
    pub outcomes: Vec<(ChannelKind, ChannelOutcome)>,
    /// The channel selector did not name a known channel; nothing was sent.
    pub unknown_channel: bool,
    /// Whether an overview paragraph made it into the digest.
    pub overview_included: bool,
}

impl DispatchReport {
    /// Number of channels that were attempted.
    pub fn attempted(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.attempted()).count()
    }

    /// True if at least one channel was attempted and every attempted
    /// channel delivered.
    pub fn succeeded(&self) -> bool {
        !self.unknown_channel
            && self.attempted() > 0
            && self
                .outcomes
                .iter()
                .filter(|(_, o)| o.attempted())
                .all(|(_, o)| *o == ChannelOutcome::Delivered)
    }
}

/// Sends one day's digest to the configured channels.
pub struct Dispatcher {
    config: NotifyConfig,
    generator: DigestGenerator,
    overview: Option<Arc<dyn OverviewSource>>,
}

impl Dispatcher {
    /// Create a dispatcher without an overview source.
    #[must_use]
    pub fn new(config: NotifyConfig, kind: DigestKind) -> Self {
        Self {
            config,
            generator: DigestGenerator::new(kind),
            overview: None,
        }
    }

    /// Ask `source` for an overview paragraph on non-empty runs.
    #[must_use]
    pub fn with_overview(mut self, source: Arc<dyn OverviewSource>) -> Self {
        self.overview = Some(source);
        self
    }

    /// Dispatch `records` and return overall success.
    pub async fn dispatch(&self, records: &[SummaryRecord], today: NaiveDate) -> bool {
        self.dispatch_report(records, today).await.succeeded()
    }

    /// Dispatch `records` and return the per-channel report.
    ///
    /// Channels are handled one after another in selection order. A channel
    /// with incomplete configuration is skipped without affecting the others.
    pub async fn dispatch_report(&self, records: &[SummaryRecord], today: NaiveDate) -> DispatchReport {
        let mut report = DispatchReport::default();

        let selection = match self.config.selection() {
            Ok(selection) => selection,
            Err(e) => {
                tracing::error!(error = %e, "Cannot dispatch digest");
                report.unknown_channel = true;
                return report;
            }
        };

        let checked: Vec<(ChannelKind, Vec<&'static str>)> = selection
            .kinds()
            .into_iter()
            .map(|kind| (kind, self.config.missing_fields(kind)))
            .collect();

        let overview = if checked.iter().any(|(_, missing)| missing.is_empty()) {
            self.fetch_overview(records).await
        } else {
            None
        };
        report.overview_included = overview.is_some();

        let title = self.generator.title(today);
        let mut rendered: Vec<(MessageStyle, String)> = Vec::new();

        for (kind, missing) in checked {
            if !missing.is_empty() {
                tracing::error!(
                    channel = %kind,
                    missing = %missing.join(", "),
                    "Channel not configured, skipping"
                );
                report.outcomes.push((kind, ChannelOutcome::Skipped { missing }));
                continue;
            }

            let style = kind.style();
            let text = if let Some((_, text)) = rendered.iter().find(|(s, _)| *s == style) {
                text.clone()
            } else {
                let text = self
                    .generator
                    .format(records, style, overview.as_deref(), today);
                rendered.push((style, text.clone()));
                text
            };

            let channel = build_channel(kind, &self.config, &title);
            let limit = channel.max_message_len();
            let chunks = segment(&text, limit);

            for (i, chunk) in chunks.iter().enumerate() {
                let chars = message_len(chunk);
                if chars > limit {
                    tracing::warn!(
                        channel = %kind,
                        part = i + 1,
                        chars,
                        limit,
                        "Single record exceeds channel limit, sending oversized message"
                    );
                }
            }

            tracing::info!(
                channel = %kind,
                records = records.len(),
                parts = chunks.len(),
                "Sending digest"
            );

            let outcome = if channel.send_all(&chunks).await {
                ChannelOutcome::Delivered
            } else {
                ChannelOutcome::Failed
            };
            tracing::info!(channel = %kind, outcome = %outcome, "Channel done");
            report.outcomes.push((kind, outcome));
        }

        if report.attempted() == 0 {
            tracing::error!("No channel was configured, digest not sent");
        }

        report
    }

    async fn fetch_overview(&self, records: &[SummaryRecord]) -> Option<String> {
        if records.is_empty() {
            return None;
        }
        let source = self.overview.as_ref()?;

        match source.overview(self.generator.kind(), records).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                tracing::warn!("Overview was empty, continuing without it");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Overview generation failed, continuing without it");
                None
            }
        }
    }
}
