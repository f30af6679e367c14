//! bsa-dc (Dataset Curator)
//!
//! Batch tool: archive of labelled scans in, feature CSV out.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bsa_dc::{curate_path, write_csv_path, LabelMapping, LabelPrefix, DEFAULT_ROOT};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for bsa-dc
#[derive(Parser, Debug)]
#[command(name = "bsa-dc")]
#[command(about = "Extract brain scan features from a labelled zip archive into CSV")]
#[command(version)]
struct Args {
    /// Zip archive with images under <root>/<Label>/
    #[arg(short, long, env = "BSA_ARCHIVE")]
    archive: PathBuf,

    /// Output CSV path
    #[arg(short, long, env = "BSA_OUTPUT")]
    output: PathBuf,

    /// Label folder and id prefix as NAME=PREFIX (repeatable, processed in order)
    #[arg(short, long = "label", value_name = "NAME=PREFIX")]
    labels: Vec<LabelPrefix>,

    /// Top-level folder inside the archive
    #[arg(long, default_value = DEFAULT_ROOT)]
    root: String,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bsa_dc=info,bsa_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mapping = if args.labels.is_empty() {
        LabelMapping::default()
    } else {
        LabelMapping::new(args.labels)?
    };

    info!(
        "Starting feature extraction from {} ({} labels)",
        args.archive.display(),
        mapping.entries().len()
    );

    let report = curate_path(&args.archive, &args.root, &mapping)
        .with_context(|| format!("Failed to curate {}", args.archive.display()))?;

    write_csv_path(&args.output, &report.rows)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if !report.skipped.is_empty() {
        warn!("{} files skipped", report.skipped.len());
    }
    info!(
        "Done: {} rows written to {}",
        report.rows.len(),
        args.output.display()
    );

    Ok(())
}
