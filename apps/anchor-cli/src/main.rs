//! Anchor CLI binary
//!
//! Reads a JSON job, anchors its quotations, and prints the result to stdout.

use anchor_cli::{Job, OutputFormat};
use anchor_engine::{AnchorConfig, Anchorer, OverlapPolicy};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "anchor")]
#[command(
    version,
    about = "Anchor analysis quotations onto rendered document text"
)]
struct Args {
    /// Job file (JSON), or "-" for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum quotation length in chars
    #[arg(long)]
    min_quote_chars: Option<usize>,

    /// Prefix length in chars for the fallback search
    #[arg(long)]
    fallback_prefix_chars: Option<usize>,

    /// Disable the prefix fallback search
    #[arg(long)]
    no_fallback: bool,

    /// Drop overlapping quotations instead of clipping them
    #[arg(long)]
    drop_overlaps: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

impl Args {
    fn anchor_config(&self) -> anyhow::Result<AnchorConfig> {
        let mut config = match &self.config {
            Some(path) => AnchorConfig::from_file(path)?,
            None => AnchorConfig::default(),
        };
        if let Some(chars) = self.min_quote_chars {
            config = config.with_min_quote_chars(chars);
        }
        if let Some(chars) = self.fallback_prefix_chars {
            config = config.with_fallback_prefix_chars(chars);
        }
        if self.no_fallback {
            config = config.with_fallback(false);
        }
        if self.drop_overlaps {
            config = config.with_overlap_policy(OverlapPolicy::Drop);
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the result, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let anchorer = Anchorer::with_config(args.anchor_config()?)?;
    tracing::debug!("Using {:?}", anchorer.config());

    let job = Job::read(&args.input)?;
    tracing::info!(
        "Anchoring {} quotations from {}",
        job.quotations.len(),
        args.input.display()
    );

    let output = job.execute(&anchorer)?;
    println!("{}", output.render(args.format)?);

    Ok(())
}
