//! Summary records handed over by the paper and project producers.
//!
//! Records arrive already scored, sorted and capped; nothing in this crate
//! reorders or filters them.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary of one research paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    pub title: String,
    /// Author names in publication order.
    #[serde(default)]
    pub authors: Vec<String>,
    pub url: String,
    /// Relevance to the reader's research interests (0-10).
    pub relevance_score: u8,
    /// One-sentence core contribution.
    pub core_contribution: String,
    /// What the paper suggests for edge intelligence work.
    pub edge_insight: String,
}

/// Summary of one trending repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Repository name in `owner/repo` form.
    pub name: String,
    pub url: String,
    pub stars: u64,
    pub stars_today: u64,
    /// Description as published on the repository page.
    #[serde(default)]
    pub description: String,
    pub summary: String,
    pub highlights: String,
    pub use_cases: String,
    /// Recommendation score (0-10).
    pub score: u8,
}

/// A display-ready record, one block in the digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryRecord {
    Paper(PaperSummary),
    Project(ProjectSummary),
}

impl SummaryRecord {
    /// Get the paper title or repository name.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Paper(p) => &p.title,
            Self::Project(p) => &p.name,
        }
    }

    /// Get the record's link.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Paper(p) => &p.url,
            Self::Project(p) => &p.url,
        }
    }

    /// Get the 0-10 score shown in the digest.
    #[must_use]
    pub const fn score(&self) -> u8 {
        match self {
            Self::Paper(p) => p.relevance_score,
            Self::Project(p) => p.score,
        }
    }
}

impl From<PaperSummary> for SummaryRecord {
    fn from(p: PaperSummary) -> Self {
        Self::Paper(p)
    }
}

impl From<ProjectSummary> for SummaryRecord {
    fn from(p: ProjectSummary) -> Self {
        Self::Project(p)
    }
}

/// Which daily digest is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// Research papers from arXiv and feeds
    #[default]
    Papers,
    /// Trending AI repositories
    Projects,
}

impl DigestKind {
    /// Get the digest's display title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Papers => "AI-Scholar-Daily",
            Self::Projects => "GitHub AI Trending",
        }
    }

    /// Get the noun used when counting records.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Projects => "projects",
        }
    }
}

impl fmt::Display for DigestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Papers => "papers",
            Self::Projects => "projects",
        })
    }
}

impl FromStr for DigestKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "papers" | "paper" | "arxiv" => Ok(Self::Papers),
            "projects" | "project" | "github" => Ok(Self::Projects),
            other => anyhow::bail!("Unknown digest kind: {other} (expected papers or projects)"),
        }
    }
}

/// Parse records from JSON: either an array or `{"records": [...]}`.
///
/// Elements that do not deserialize as a [`SummaryRecord`] are logged and
/// skipped; the remaining records are kept in order.
pub fn parse_records(json: &str) -> Result<Vec<SummaryRecord>> {
    let value: Value = serde_json::from_str(json).context("Invalid records JSON")?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            _ => bail!("Invalid records JSON: expected an array or an object with a \"records\" array"),
        },
        _ => bail!("Invalid records JSON: expected an array or an object with a \"records\" array"),
    };

    let total = items.len();
    let records: Vec<SummaryRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(kept = records.len(), total, "Some records were skipped");
    }

    Ok(records)
}

/// Load records from a file, or from stdin when `path` is `-`.
pub fn load_records(path: &Path) -> Result<Vec<SummaryRecord>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read records from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read records file {}", path.display()))?
    };

    parse_records(&content)
}
