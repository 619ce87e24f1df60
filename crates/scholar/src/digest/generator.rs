//! Digest content generator.
//!
//! Builds the chat message for one run from summary records. Two styles are
//! produced: Telegram MarkdownV2 ("rich") and plain text for channels
//! without markup.
//!
//! Record blocks are separated by a line holding only `---`. The notifier
//! splits long digests on that line, so user text is never allowed to
//! produce one.

use chrono::NaiveDate;
use notify::MessageStyle;

use crate::records::{DigestKind, PaperSummary, ProjectSummary, SummaryRecord};

/// Characters MarkdownV2 reserves outside of entities.
pub const MARKDOWN_SPECIAL_CHARS: [char; 18] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Separator line between record blocks.
const SEPARATOR: &str = "---";

/// Authors listed per paper before the rest are dropped.
const MAX_AUTHORS: usize = 3;

/// Generates digest messages from summary records.
#[derive(Debug, Clone, Copy)]
pub struct DigestGenerator {
    kind: DigestKind,
}

impl DigestGenerator {
    /// Create a generator for one kind of digest.
    #[must_use]
    pub const fn new(kind: DigestKind) -> Self {
        Self { kind }
    }

    /// Get the kind of digest this generator renders.
    #[must_use]
    pub const fn kind(&self) -> DigestKind {
        self.kind
    }

    /// Render the digest for `records` in the order given.
    ///
    /// An empty record list renders the "nothing today" message instead.
    #[must_use]
    pub fn format(
        &self,
        records: &[SummaryRecord],
        style: MessageStyle,
        overview: Option<&str>,
        today: NaiveDate,
    ) -> String {
        if records.is_empty() {
            return self.format_empty(style, today);
        }

        let r = Renderer { style };
        let mut lines = vec![self.header(r, today), String::new()];

        if let Some(overview) = overview.map(str::trim).filter(|o| !o.is_empty()) {
            lines.push(format!("📝 {}", r.emphasis("Today's overview")));
            lines.extend(overview.lines().map(|line| r.overview_line(line)));
            lines.push(String::new());
        }

        let intro = match self.kind {
            DigestKind::Papers => format!(
                "Today's picks: {} highly relevant {}",
                records.len(),
                self.kind.noun()
            ),
            DigestKind::Projects => format!(
                "Today's picks: {} trending AI {}",
                records.len(),
                self.kind.noun()
            ),
        };
        lines.push(r.text(&intro));
        lines.extend([String::new(), SEPARATOR.to_string(), String::new()]);

        for (i, record) in records.iter().enumerate() {
            let index = i + 1;
            match record {
                SummaryRecord::Paper(paper) => Self::paper_block(r, index, paper, &mut lines),
                SummaryRecord::Project(project) => {
                    Self::project_block(r, index, project, &mut lines);
                }
            }
            lines.extend([String::new(), SEPARATOR.to_string(), String::new()]);
        }

        let closing = match self.kind {
            DigestKind::Papers => "📖 Happy reading!",
            DigestKind::Projects => "🚀 Happy hacking!",
        };
        lines.push(r.text(closing));

        lines.join("\n")
    }

    /// Render the message sent when no record made the cut.
    #[must_use]
    pub fn format_empty(&self, style: MessageStyle, today: NaiveDate) -> String {
        let r = Renderer { style };
        let nothing = match self.kind {
            DigestKind::Papers => "No highly relevant papers today.",
            DigestKind::Projects => "No trending AI projects today.",
        };

        format!(
            "{header}\n\n{nothing}\n\n{bye}\n",
            header = self.header(r, today),
            nothing = r.text(nothing),
            bye = r.text("See you tomorrow! 🌟"),
        )
    }

    /// Subject line used by channels that carry a title.
    #[must_use]
    pub fn title(&self, today: NaiveDate) -> String {
        format!("{} {}", self.kind.title(), today.format("%Y-%m-%d"))
    }

    fn header(&self, r: Renderer, today: NaiveDate) -> String {
        format!(
            "📚 {} {} {}",
            r.emphasis(self.kind.title()),
            r.text("|"),
            r.text(&today.format("%Y-%m-%d").to_string())
        )
    }

    fn paper_block(r: Renderer, index: usize, paper: &PaperSummary, lines: &mut Vec<String>) {
        let authors = if paper.authors.is_empty() {
            "Unknown".to_string()
        } else {
            paper
                .authors
                .iter()
                .take(MAX_AUTHORS)
                .map(|a| single_line(a))
                .collect::<Vec<_>>()
                .join(", ")
        };

        r.title_lines(index, &paper.title, &paper.url, lines);
        lines.push(r.field("👤 Authors: ", &authors));
        lines.push(r.text(&format!("⭐ Relevance: {}/10", paper.relevance_score)));
        lines.push(r.field("💡 Core contribution: ", &paper.core_contribution));
        lines.push(r.field("🔗 Edge insight: ", &paper.edge_insight));
    }

    fn project_block(r: Renderer, index: usize, project: &ProjectSummary, lines: &mut Vec<String>) {
        r.title_lines(index, &project.name, &project.url, lines);
        lines.push(r.text(&format!(
            "⭐ Stars: {} (+{} today)",
            thousands(project.stars),
            thousands(project.stars_today)
        )));
        lines.push(r.text(&format!("🏆 Score: {}/10", project.score)));
        lines.push(r.field("📝 Summary: ", &project.summary));
        lines.push(r.field("✨ Highlights: ", &project.highlights));
        lines.push(r.field("🎯 Use cases: ", &project.use_cases));
    }
}

/// Style-aware text helpers.
#[derive(Debug, Clone, Copy)]
struct Renderer {
    style: MessageStyle,
}

impl Renderer {
    /// Literal or user text, escaped for rich style.
    fn text(self, s: &str) -> String {
        match self.style {
            MessageStyle::Rich => escape_markdown(s),
            MessageStyle::Plain => s.to_string(),
        }
    }

    fn emphasis(self, s: &str) -> String {
        match self.style {
            MessageStyle::Rich => format!("*{}*", escape_markdown(s)),
            MessageStyle::Plain => s.to_string(),
        }
    }

    /// A labelled single-line field.
    fn field(self, label: &str, value: &str) -> String {
        self.text(&format!("{label}{}", single_line(value)))
    }

    fn overview_line(self, line: &str) -> String {
        match self.style {
            MessageStyle::Rich => escape_markdown(line),
            MessageStyle::Plain if line.trim() == SEPARATOR => "- - -".to_string(),
            MessageStyle::Plain => line.to_string(),
        }
    }

    fn title_lines(self, index: usize, title: &str, url: &str, lines: &mut Vec<String>) {
        let title = single_line(title);
        match self.style {
            MessageStyle::Rich => lines.push(format!(
                "*{index}\\. [{}]({})*",
                escape_markdown(&title),
                escape_link_url(url)
            )),
            MessageStyle::Plain => {
                lines.push(format!("{index}. {title}"));
                lines.push(format!("🌐 {}", url.trim()));
            }
        }
    }
}

/// Escape every MarkdownV2 reserved character with a backslash.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Escape the characters MarkdownV2 reserves inside a link target.
fn escape_link_url(url: &str) -> String {
    url.trim().replace('\\', "\\\\").replace(')', "\\)")
}

/// Collapse line breaks so a field stays inside its block line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a count with comma thousands separators.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
