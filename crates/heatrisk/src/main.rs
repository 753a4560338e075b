use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use heatrisk_core::{
    benefits, collate, config::PipelineConfig, excess_deaths, heatwave, pipeline, threshold,
    Alignment,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grid-cell heat threshold, heatwave, excess death and early-warning analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Per-cell 97.5th percentile of the baseline temperature files
    Threshold(ThresholdArgs),
    /// Days at or above the baseline threshold for every scenario/model/year file
    Heatwave(HeatwaveArgs),
    /// Gather one scenario/model's yearly heatwave counts into a wide table
    Collate(CollateArgs),
    /// Excess deaths from exposure-response ratios and mean daily deaths
    ExcessDeaths(ExcessDeathsArgs),
    /// Deaths avoided by early warning, by age band
    Benefits(BenefitsArgs),
    /// Run the stages listed in a TOML pipeline config
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct ThresholdArgs {
    /// Directory holding the baseline CSV files
    #[arg(long)]
    baseline_dir: PathBuf,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct HeatwaveArgs {
    /// Root of the <scenario>/<model>/<file><YYYY>.csv tree
    #[arg(long)]
    future_dir: PathBuf,
    #[arg(long)]
    threshold: PathBuf,
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct CollateArgs {
    /// Directory holding the heatwave stage outputs
    #[arg(long)]
    heatwave_dir: PathBuf,
    #[arg(long)]
    scenario: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Alignment::Position)]
    alignment: Alignment,
}

#[derive(Args, Debug)]
struct ExcessDeathsArgs {
    #[arg(long)]
    er: PathBuf,
    #[arg(long)]
    mortality: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Alignment::Position)]
    alignment: Alignment,
}

#[derive(Args, Debug)]
struct BenefitsArgs {
    /// Wide table of HeatwaveDays_<year> columns
    #[arg(long)]
    heatwave: PathBuf,
    #[arg(long)]
    pop65: PathBuf,
    #[arg(long)]
    pop_u65: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Alignment::Position)]
    alignment: Alignment,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Pipeline config; falls back to HEATRISK_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the run manifest to stdout
    #[arg(long)]
    print_manifest: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Threshold(args) => {
            threshold::calculate_baseline_threshold(&args.baseline_dir, &args.output)
                .with_context(|| {
                    format!("baseline threshold failed for {}", args.baseline_dir.display())
                })?;
            Ok(())
        }
        Command::Heatwave(args) => {
            heatwave::count_heatwave_days(&args.future_dir, &args.threshold, &args.output_dir)
                .with_context(|| {
                    format!("heatwave day count failed for {}", args.future_dir.display())
                })?;
            Ok(())
        }
        Command::Collate(args) => {
            collate::write_collated_heatwave_days(
                &args.heatwave_dir,
                &args.scenario,
                &args.model,
                &args.output,
                args.alignment.strategy(),
            )
            .with_context(|| format!("collation failed for {}/{}", args.scenario, args.model))?;
            Ok(())
        }
        Command::ExcessDeaths(args) => {
            excess_deaths::calculate_excess_deaths_with(
                &args.er,
                &args.mortality,
                &args.output,
                args.alignment.strategy(),
            )
            .with_context(|| format!("excess deaths failed for {}", args.er.display()))?;
            Ok(())
        }
        Command::Benefits(args) => {
            benefits::calculate_early_warning_benefits_with(
                &args.heatwave,
                &args.pop65,
                &args.pop_u65,
                &args.output,
                args.alignment.strategy(),
            )
            .with_context(|| {
                format!("early warning benefits failed for {}", args.heatwave.display())
            })?;
            Ok(())
        }
        Command::Run(args) => handle_run(args),
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    let config_path = resolve_config_path(args.config)?;
    let config = PipelineConfig::load(&config_path)
        .with_context(|| format!("failed to load pipeline config {}", config_path.display()))?;

    info!(config = %config_path.display(), "Starting pipeline run");
    let manifest = pipeline::run_pipeline(&config)?;

    if args.print_manifest {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    }
    Ok(())
}

fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    dotenvy::dotenv().ok();
    env::var("HEATRISK_CONFIG")
        .map(PathBuf::from)
        .context("--config or HEATRISK_CONFIG must be set")
}
