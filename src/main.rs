//! cpsreport - labor-market indicators from CPS microdata
//!
//! A CLI tool that fetches Current Population Survey basic monthly files
//! from the Census data API and writes survey-weighted labor-market
//! indicators for each month as a JSON (or Markdown) report.
//!
//! Exit codes:
//!   0 - Success (at least one month contributed data)
//!   1 - Runtime error (bad arguments, config, or no month could be fetched)

mod analysis;
mod cli;
mod config;
mod fetch;
mod lookup;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use fetch::CensusClient;
use indicatif::{ProgressBar, ProgressStyle};
use lookup::CodeLookup;
use report::{MonthlyReportBuilder, StatsSettings};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts so its verbose flag applies
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, config.general.verbose);

    info!("cpsreport v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", config_source);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_report(args, config).await {
        error!("Report failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .cpsreport.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the lookback window, API settings, and thresholds.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = if config_verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete fetch, compute and write workflow.
async fn run_report(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    config.validate()?;

    let api_key = args
        .api_key
        .clone()
        .map(|k| k.trim().to_string())
        .context("A Census API key is required")?;

    let months = args.target_months(config.general.lookback_months, Utc::now().date_naive());
    let requested = months.len();
    let (first, last) = match (months.first(), months.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => anyhow::bail!("No months to fetch"),
    };

    // Step 1: Fetch every month
    println!(
        "📥 Fetching {} month(s) of CPS microdata: {} to {}",
        requested, first, last
    );
    println!("   API: {}", config.api.base_url);
    println!("   Concurrency: {}", config.general.concurrency);

    let client = CensusClient::new(&config.api, api_key)?;
    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(requested as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} months")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let outcomes = fetch::collect_months(months, config.general.concurrency, |period| {
        let client = &client;
        let progress = &progress;
        async move {
            let result = client.fetch_month(period).await;
            match &result {
                Ok(batch) => debug!("{}: {} rows", period, batch.len()),
                Err(e) => warn!("{}: {}", period, e),
            }
            progress.inc(1);
            result
        }
    })
    .await;
    progress.finish_and_clear();

    // Step 2: Compute indicators
    println!("\n🔬 Computing indicators...");

    let lookup = CodeLookup::cps();
    let settings = StatsSettings::from(&config.stats);
    let builder = MonthlyReportBuilder::new(&lookup, &settings);
    let report = report::assemble(
        outcomes,
        requested,
        &builder,
        config.report.include_aggregates,
        Utc::now(),
    )?;

    // Step 3: Render and save
    println!("\n📝 Generating report...");

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };
    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Report Summary:");
    println!(
        "   Months with data: {} of {}",
        report.lookback_months, report.requested_months
    );
    if report.lookback_months < report.requested_months {
        println!(
            "   ⚠️  {} month(s) could not be fetched and were skipped",
            report.requested_months - report.lookback_months
        );
    }
    if let Some(latest) = report.monthly.last() {
        println!(
            "   Latest month ({}): unemployment {}%, median wage ${}",
            latest.period(),
            latest
                .unemployment_rate
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
            latest
                .median_hourly_wage
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v)),
        );
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Report complete! Saved to: {}",
        output_path.display()
    );

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// A config file that exists but cannot be read or parsed is an error.
/// Also returns a line describing where the settings came from, logged once
/// the subscriber is installed.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, format!("Loaded config from: {}", config_path.display())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, format!("Loaded default config from {}", CONFIG_FILE))),
        None => Ok((
            Config::default(),
            "No config file found, using defaults".to_string(),
        )),
    }
}
