//! `chronoxide` binary

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use co_cli::{init_logging, run, Config};
use co_core::io::{reshape_file, DEFAULT_DATE_HEADER};
use co_core::SourceKind;

/// Granger causality analysis of monthly temperature and accident/mortality series
#[derive(Parser, Debug)]
#[command(name = "chronoxide", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply to every missing key
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the configuration
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log file, overrides the configuration
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full analysis pipeline
    Run(RunArgs),
    /// Convert the wide road-accident table into the long loader format
    Reshape(ReshapeArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Daily temperature CSV
    #[arg(long)]
    temperature: Option<PathBuf>,

    /// Mortality or road-accident CSV
    #[arg(long)]
    secondary: Option<PathBuf>,

    /// Kind of the secondary file: mortality or road_accidents
    #[arg(long, value_parser = parse_dataset)]
    dataset: Option<SourceKind>,

    /// Column of the secondary file to analyse
    #[arg(long)]
    column: Option<String>,

    /// Write the JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Skip rolling-origin evaluation and the bootstrap
    #[arg(long)]
    no_validation: bool,
}

#[derive(Args, Debug)]
struct ReshapeArgs {
    input: PathBuf,
    output: PathBuf,

    /// Header written above the month column
    #[arg(long, default_value = DEFAULT_DATE_HEADER)]
    date_header: String,
}

fn parse_dataset(raw: &str) -> Result<SourceKind, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "mortality" => Ok(SourceKind::Mortality),
        "road_accidents" => Ok(SourceKind::RoadAccidents),
        other => Err(format!(
            "unknown dataset '{}', expected 'mortality' or 'road_accidents'",
            other
        )),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(file) = cli.log_file {
        config.logging.file = Some(file);
    }
    init_logging(&config.logging);

    match cli.command {
        Command::Run(args) => run_pipeline(config, args),
        Command::Reshape(args) => {
            let summary = reshape_file(&args.input, &args.output, &args.date_header)
                .with_context(|| format!("failed to reshape {}", args.input.display()))?;
            println!(
                "Wrote {} months of {} indicators to {}",
                summary.months,
                summary.indicators.len(),
                args.output.display()
            );
            Ok(())
        }
    }
}

fn run_pipeline(mut config: Config, args: RunArgs) -> Result<()> {
    if let Some(path) = args.temperature {
        config.data.temperature_path = path;
    }
    if let Some(path) = args.secondary {
        config.data.secondary_path = path;
    }
    if let Some(kind) = args.dataset {
        config.data.secondary_dataset = kind;
    }
    if args.column.is_some() {
        config.data.secondary_column = args.column;
    }
    if args.no_validation {
        config.validation.enabled = false;
    }

    let report = run(&config)?;
    println!("{}", report.var);
    println!("{}", report.granger_summary);

    if let Some(path) = args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}
