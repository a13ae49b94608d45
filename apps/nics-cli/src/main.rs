//! NICS report extractor
//!
//! Reads a monthly NICS firearm background check report, validates every
//! page's totals and writes the state rows as CSV.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use nics_core::{
    assemble, assemble_parallel, write_csv, ColumnSchema, Config, PageExtractor, StateCorrections,
};
use nics_pdf::PdfDocument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "nics-extract")]
#[command(version, about = "Extract and validate NICS firearm check tables from a PDF report")]
struct Args {
    /// Report PDF to read
    input: PathBuf,

    /// CSV file to write
    #[arg(short, long, default_value = "guns_output.csv")]
    output: PathBuf,

    /// TOML file overriding the page layout, label corrections or exclusions
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extract pages on all cores
    #[arg(long)]
    parallel: bool,

    /// Log every page and stage
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let started = Instant::now();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let document = PdfDocument::open(&args.input)
        .with_context(|| format!("Failed to open report: {}", args.input.display()))?;
    let pages = document
        .pages()
        .with_context(|| format!("Failed to read pages of {}", args.input.display()))?;

    let schema = ColumnSchema::nics();
    let corrections = StateCorrections::from(&config.corrections);
    let extractor = PageExtractor::new(&schema, &config.layout, &corrections);
    let dataset = if args.parallel {
        assemble_parallel(&pages, &extractor)?
    } else {
        assemble(&pages, &extractor)?
    };

    let written = write_csv(&args.output, &dataset, &config.export)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        pages = pages.len(),
        months = dataset.months().len(),
        rows = written,
        output = %args.output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "extraction complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["nics-extract", "NICS.pdf"]).unwrap();
        assert_eq!(args.input, PathBuf::from("NICS.pdf"));
        assert_eq!(args.output, PathBuf::from("guns_output.csv"));
        assert!(args.config.is_none());
        assert!(!args.parallel);
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "nics-extract",
            "report.pdf",
            "-o",
            "out.csv",
            "--config",
            "nics.toml",
            "--parallel",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!(args.config, Some(PathBuf::from("nics.toml")));
        assert!(args.parallel && args.verbose);
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["nics-extract"]).is_err());
    }

    #[test]
    fn test_missing_input_fails_with_path() {
        let args = Args::try_parse_from(["nics-extract", "/nonexistent/report.pdf"]).unwrap();
        let err = run(&args).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/report.pdf"));
    }
}
