//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cpsreport.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".cpsreport.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Census API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Statistic parameters.
    #[serde(default)]
    pub stats: StatsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Number of months to look back from the end month.
    #[serde(default = "default_lookback_months")]
    pub lookback_months: usize,

    /// Number of months fetched concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            lookback_months: default_lookback_months(),
            concurrency: default_concurrency(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "cps_report.json".to_string()
}

fn default_lookback_months() -> usize {
    12
}

fn default_concurrency() -> usize {
    2
}

/// Census data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the data API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of retries on transient failure.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Initial backoff between retries, doubled after each attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.census.gov/data".to_string()
}

fn default_timeout() -> u64 {
    120 // a full month is ~100k rows
}

fn default_retries() -> usize {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

/// Parameters for the indicator battery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Hourly minimum wage threshold in dollars.
    #[serde(default = "default_min_wage")]
    pub min_wage: f64,

    /// Minimum raw sample size for a group to appear in rankings.
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,

    /// Length of top/bottom rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Weekly hours above which time counts as overtime.
    #[serde(default = "default_overtime_baseline")]
    pub overtime_baseline: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_wage: default_min_wage(),
            min_group_size: default_min_group_size(),
            top_n: default_top_n(),
            overtime_baseline: default_overtime_baseline(),
        }
    }
}

fn default_min_wage() -> f64 {
    7.25
}

fn default_min_group_size() -> usize {
    crate::analysis::aggregator::MIN_GROUP_SAMPLE
}

fn default_top_n() -> usize {
    10
}

fn default_overtime_baseline() -> f64 {
    40.0
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Add industry/occupation sections computed over all fetched months.
    #[serde(default = "default_true")]
    pub include_aggregates: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_aggregates: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load `.cpsreport.toml` from `dir` if present.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(months) = args.months {
            self.general.lookback_months = months;
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(min_wage) = args.min_wage {
            self.stats.min_wage = min_wage;
        }
        if let Some(top_n) = args.top_n {
            self.stats.top_n = top_n;
        }

        if args.no_aggregates {
            self.report.include_aggregates = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.general.lookback_months == 0 {
            anyhow::bail!("lookback_months must be at least 1");
        }
        if self.general.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if !(self.stats.min_wage.is_finite() && self.stats.min_wage > 0.0) {
            anyhow::bail!("min_wage must be a positive amount");
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            anyhow::bail!("API base URL must start with 'http://' or 'https://'");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
