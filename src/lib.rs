pub mod cli;
pub mod config;
pub mod correlation;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod frequency;
pub mod inference;
pub mod insights;
pub mod loader;
pub mod output;
pub mod profile;
pub mod recommend;
pub mod stats;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs},
    config::ProfileOptions,
    dashboard::ChartRegistry,
    loader::LoadOptions,
    output::OutputFormat,
};

pub use crate::{
    data::{Cell, Dataset, Record},
    profile::{Report, profile, profile_with},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Insights(args) => handle_insights(&args),
        Commands::Recommend(args) => handle_recommend(&args),
        Commands::Dashboard(args) => handle_dashboard(&args),
    }
}

fn profile_input(args: &InputArgs) -> Result<Report> {
    let options = match &args.config {
        Some(path) => ProfileOptions::load(path)
            .with_context(|| format!("Loading profile options from {path:?}"))?,
        None => ProfileOptions::default(),
    };
    debug!("Profile options: {options:?}");
    let load_options = LoadOptions {
        format: args.input_format,
        delimiter: args.delimiter,
        encoding: loader::resolve_encoding(args.input_encoding.as_deref())?,
        limit: args.limit,
    };
    info!("Profiling '{}'", args.input.display());
    let dataset = loader::load_dataset(&args.input, &load_options)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;
    let report = profile_with(&dataset, &options);
    info!(
        "Profiled {} row(s) across {} column(s)",
        report.row_count, report.column_count
    );
    Ok(report)
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let report = profile_input(&args.input)?;
    let rendered = match args.format {
        OutputFormat::Table => output::render_report(&report),
        format => output::serialize(&report, format)?,
    };
    output::write_output(args.output.as_deref(), &rendered)
        .with_context(|| format!("Writing report for {:?}", args.input.input))
}

fn handle_insights(args: &InputArgs) -> Result<()> {
    let report = profile_input(args)?;
    if report.insights.is_empty() {
        println!("No insights found.");
        return Ok(());
    }
    print!("{}", output::render_insights(&report.insights));
    info!("Derived {} insight(s)", report.insights.len());
    Ok(())
}

fn handle_recommend(args: &InputArgs) -> Result<()> {
    let report = profile_input(args)?;
    if report.recommendations.is_empty() {
        println!("No chart recommendations: the dataset has no numeric columns.");
        return Ok(());
    }
    print!("{}", output::render_recommendations(&report.recommendations));
    info!("Recommended {} chart(s)", report.recommendations.len());
    Ok(())
}

fn handle_dashboard(args: &cli::DashboardArgs) -> Result<()> {
    let report = profile_input(&args.input)?;
    let registry = ChartRegistry::from_report(&report).context("Building dashboard charts")?;
    let rendered = output::serialize(&registry.charts(), OutputFormat::Json)?;
    output::write_output(args.output.as_deref(), &rendered)?;
    info!("Generated {} dashboard chart(s)", registry.len());
    Ok(())
}
