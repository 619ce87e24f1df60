//! Short overview paragraph placed above the record list.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::ai::{ChatClient, ChatMessage};
use crate::records::{DigestKind, SummaryRecord};

/// Records included in the overview prompt.
const MAX_PROMPT_RECORDS: usize = 20;

/// Produces the overview text for a run.
///
/// Callers treat any error as "no overview"; the digest is still sent.
#[async_trait]
pub trait OverviewSource: Send + Sync {
    /// Summarize `records` in a few sentences of plain text.
    async fn overview(&self, kind: DigestKind, records: &[SummaryRecord]) -> Result<String>;
}

/// Overview written by a chat completion model.
#[derive(Debug, Clone)]
pub struct LlmOverview {
    client: Arc<ChatClient>,
}

impl LlmOverview {
    /// Create an overview source backed by `client`.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    fn prompt(kind: DigestKind, records: &[SummaryRecord]) -> String {
        let items: Vec<String> = records
            .iter()
            .take(MAX_PROMPT_RECORDS)
            .map(|record| match record {
                SummaryRecord::Paper(p) => format!(
                    "- {} (relevance {}/10): {}",
                    p.title, p.relevance_score, p.core_contribution
                ),
                SummaryRecord::Project(p) => format!(
                    "- {} ({} stars, +{} today): {}",
                    p.name, p.stars, p.stars_today, p.summary
                ),
            })
            .collect();

        format!(
            "Here are today's {count} {noun}:\n{items}\n\n\
             Write a 2-3 sentence overview of the common themes and the single most \
             notable item. Plain text only, no markdown, no lists, no line made of dashes.",
            count = records.len(),
            noun = kind.noun(),
            items = items.join("\n"),
        )
    }
}

#[async_trait]
impl OverviewSource for LlmOverview {
    async fn overview(&self, kind: DigestKind, records: &[SummaryRecord]) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::prompt(kind, records)),
        ];

        tracing::debug!(model = self.client.model(), records = records.len(), "Requesting overview");

        self.client
            .complete(&messages, 0.4, 300)
            .await
            .context("overview generation failed")
    }
}

const SYSTEM_PROMPT: &str = "You are the editor of a daily AI research digest. \
Readers are engineers deploying models on edge devices. Be concise and concrete.";
