use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use stac_tavg::bbox::BoundingBox;
use stac_tavg::pipeline;
use stac_tavg::provider::PlanetaryComputer;
use stac_tavg::selection::Selection;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print NClimGrid average temperatures (Fahrenheit) inside a bounding box
/// for one date as a JSON array.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Date to query, YYYY-MM-DD
    date: String,

    /// TOML selection file (defaults to the built-in NClimGrid tavg selection)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bounding box
    #[arg(long, value_name = "MIN_LON,MIN_LAT,MAX_LON,MAX_LAT", allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Override the maximum number of emitted points
    #[arg(long)]
    max_points: Option<usize>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                std::process::exit(1);
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_args();
    init_tracing(cli.verbose);

    let mut selection = match &cli.config {
        Some(path) => Selection::read(path)?,
        None => Selection::default(),
    };
    if let Some(bbox) = cli.bbox {
        selection.bbox = bbox;
    }
    if let Some(max_points) = cli.max_points {
        selection.max_points = max_points;
    }
    selection.validate()?;

    info!("Starting data retrieval for date: {}", cli.date);
    let provider = PlanetaryComputer::new(
        reqwest::Client::new(),
        &selection.stac_api,
        &selection.sign_api,
    );
    let outcome = pipeline::run(&provider, &selection, &cli.date).await?;

    if let Some(path) = &cli.report {
        outcome.report.write(path)?;
        info!("Run report written to {}", path.display());
    }

    pipeline::write_records(io::stdout().lock(), &outcome.extraction.records)?;

    Ok(())
}
