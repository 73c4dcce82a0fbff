//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and the resolution of the target month window.

use crate::models::YearMonth;
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

/// cpsreport - labor-market indicators from CPS microdata
///
/// Fetches Current Population Survey basic monthly files from the Census
/// data API and computes survey-weighted labor-market indicators for each
/// month, written as a single JSON report.
///
/// Examples:
///   cpsreport --months 12
///   cpsreport --start 2023-01 --end 2023-12 --output cps_2023.json
///   cpsreport --end 2024-06 --min-wage 7.25 --format markdown
///   cpsreport --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Census data API key
    ///
    /// Required for every run except --init-config.
    #[arg(long, env = "CENSUS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Last month to include (YYYY-MM)
    ///
    /// Defaults to the month before the current one.
    #[arg(long, value_name = "YYYY-MM")]
    pub end: Option<YearMonth>,

    /// First month to include (YYYY-MM)
    ///
    /// When set, the window runs from --start to --end and --months is ignored.
    #[arg(long, value_name = "YYYY-MM")]
    pub start: Option<YearMonth>,

    /// Number of months to look back from --end
    #[arg(short, long, value_name = "COUNT")]
    pub months: Option<usize>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cpsreport.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum wage threshold in dollars per hour
    #[arg(long, value_name = "DOLLARS")]
    pub min_wage: Option<f64>,

    /// Number of groups in top/bottom rankings
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Number of months fetched concurrently
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip the industry/occupation sections computed over all months
    #[arg(long)]
    pub no_aggregates: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .cpsreport.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(
                    "A Census API key is required (--api-key or CENSUS_API_KEY)".to_string(),
                )
            }
            Some(_) => {}
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!("--start {} is after --end {}", start, end));
            }
        }

        if self.months == Some(0) {
            return Err("Months must be at least 1".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if let Some(min_wage) = self.min_wage {
            if !(min_wage.is_finite() && min_wage > 0.0) {
                return Err("Minimum wage must be a positive amount".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The months to fetch, oldest first.
    pub fn target_months(&self, lookback_months: usize, today: NaiveDate) -> Vec<YearMonth> {
        let end = self.end.unwrap_or_else(|| default_end(today));
        match self.start {
            Some(start) => YearMonth::range(start, end),
            None => YearMonth::window_ending(end, lookback_months),
        }
    }
}

/// The month before `today`'s month, the most recent one likely published.
pub fn default_end(today: NaiveDate) -> YearMonth {
    YearMonth {
        year: today.year(),
        month: today.month(),
    }
    .previous()
}
