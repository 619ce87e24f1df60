//! Scholar CLI - render and deliver the daily research digest.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use notify::{ChannelSelection, MessageStyle, NotifyConfig};
use scholar::{load_records, DigestGenerator, DigestKind, Dispatcher, LlmOverview, Settings};

/// Scholar CLI - push paper and project summaries to chat channels.
#[derive(Parser)]
#[command(name = "scholar")]
#[command(about = "Daily research digest dispatcher")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the digest and send it to the configured channels
    Send {
        /// JSON file with summary records ("-" for stdin)
        #[arg(long)]
        records: PathBuf,

        /// Digest kind (papers or projects)
        #[arg(long, default_value = "papers")]
        kind: DigestKind,

        /// Channel selector, overrides NOTIFY_CHANNEL
        #[arg(long)]
        channel: Option<String>,

        /// Skip the LLM overview paragraph
        #[arg(long)]
        no_overview: bool,
    },

    /// Print the rendered digest without sending it
    Preview {
        /// JSON file with summary records ("-" for stdin)
        #[arg(long)]
        records: PathBuf,

        /// Digest kind (papers or projects)
        #[arg(long, default_value = "papers")]
        kind: DigestKind,

        /// Rendering style
        #[arg(long, value_enum, default_value = "plain")]
        style: StyleArg,

        /// Digest date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Report missing channel configuration
    Check {
        /// Channel selector, overrides NOTIFY_CHANNEL
        #[arg(long)]
        channel: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StyleArg {
    Rich,
    Plain,
}

impl From<StyleArg> for MessageStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Rich => Self::Rich,
            StyleArg::Plain => Self::Plain,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("scholar=debug,notify=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(cli.log_json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!cli.log_json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();

    match cli.command {
        Commands::Send {
            records,
            kind,
            channel,
            no_overview,
        } => run_send(records, kind, channel, no_overview).await,
        Commands::Preview {
            records,
            kind,
            style,
            date,
        } => run_preview(records, kind, style.into(), date),
        Commands::Check { channel } => run_check(channel),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

async fn run_send(
    records_path: PathBuf,
    kind: DigestKind,
    channel: Option<String>,
    no_overview: bool,
) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(channel) = channel {
        settings.notify.channel = channel;
    }

    let records = load_records(&records_path)?;
    tracing::info!(
        records = records.len(),
        kind = %kind,
        channel = %settings.notify.channel,
        "Dispatching digest"
    );

    let mut dispatcher = Dispatcher::new(settings.notify, kind);
    match settings.llm {
        Some(llm) if !no_overview => {
            tracing::debug!(model = %llm.model, "Overview enabled");
            dispatcher = dispatcher.with_overview(Arc::new(LlmOverview::new(llm.client())));
        }
        Some(_) => tracing::debug!("Overview disabled by flag"),
        None => tracing::debug!("LLM_API_KEY not set, overview disabled"),
    }

    let report = dispatcher.dispatch_report(&records, today()).await;

    for (kind, outcome) in &report.outcomes {
        println!("{kind}: {outcome}");
    }

    if !report.succeeded() {
        bail!("digest dispatch failed");
    }

    Ok(())
}

fn run_preview(
    records_path: PathBuf,
    kind: DigestKind,
    style: MessageStyle,
    date: Option<NaiveDate>,
) -> Result<()> {
    let records = load_records(&records_path)?;
    let text = DigestGenerator::new(kind).format(&records, style, None, date.unwrap_or_else(today));
    println!("{text}");
    Ok(())
}

fn run_check(channel: Option<String>) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(channel) = channel {
        settings.notify.channel = channel;
    }

    let selection: ChannelSelection = settings
        .notify
        .selection()
        .context("invalid channel selector")?;

    let ready = report_channels(&settings.notify, selection);

    match &settings.llm {
        Some(llm) => println!("overview: enabled ({} at {})", llm.model, llm.base_url),
        None => println!("overview: disabled (LLM_API_KEY not set)"),
    }

    if ready == 0 {
        bail!("no selected channel is fully configured");
    }

    Ok(())
}

/// Print one line per selected channel and return how many are ready.
fn report_channels(config: &NotifyConfig, selection: ChannelSelection) -> usize {
    let mut ready = 0;
    for kind in selection.kinds() {
        let missing = config.missing_fields(kind);
        if missing.is_empty() {
            println!("{kind}: ready");
            ready += 1;
        } else {
            println!("{kind}: missing {}", missing.join(", "));
        }
    }
    ready
}
