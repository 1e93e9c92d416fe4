//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.sentino.toml` files.

use crate::client::DEFAULT_BASE_URL;
use crate::models::DEFAULT_INVENTORY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sentino.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API connection settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Scoring settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Sentino API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token. Prefer the SENTINO_API_TOKEN environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Scoring and batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Inventories requested when none is given on the command line.
    #[serde(default = "default_inventories")]
    pub inventories: Vec<String>,

    /// Treat an inventory missing from a result as an error.
    #[serde(default)]
    pub strict_inventory: bool,

    /// Number of scoring requests in flight during a batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            inventories: default_inventories(),
            strict_inventory: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_inventories() -> Vec<String> {
    vec![DEFAULT_INVENTORY.to_string()]
}

fn default_concurrency() -> usize {
    1
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Draw a text bar chart for every profile.
    #[serde(default = "default_true")]
    pub include_charts: bool,

    /// Width in characters of each half of a bar chart.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            include_charts: true,
            chart_width: default_chart_width(),
        }
    }
}

fn default_output() -> String {
    "sentino_report.md".to_string()
}

fn default_true() -> bool {
    true
}

fn default_chart_width() -> usize {
    20
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

    /// Try to load `.sentino.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref token) = args.token {
            self.api.token = Some(token.clone());
        }
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(concurrency) = args.concurrency {
            self.scoring.concurrency = concurrency;
        }
        if args.strict {
            self.scoring.strict_inventory = true;
        }

        if args.no_charts {
            self.report.include_charts = false;
        }

        self.enforce_minimums();
    }

    /// Raise zero values from the config file to the smallest usable setting.
    fn enforce_minimums(&mut self) {
        if self.api.timeout_seconds == 0 {
            warn!("api.timeout_seconds is 0, using 1");
            self.api.timeout_seconds = 1;
        }
        if self.scoring.concurrency == 0 {
            warn!("scoring.concurrency is 0, using 1");
            self.scoring.concurrency = 1;
        }
        if self.report.chart_width == 0 {
            warn!("report.chart_width is 0, using 1");
            self.report.chart_width = 1;
        }
    }

    /// The inventory used for single-inventory commands.
    pub fn primary_inventory(&self) -> &str {
        self.scoring
            .inventories
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_INVENTORY)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
