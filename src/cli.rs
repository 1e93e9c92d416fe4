//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sentino - personality scoring from text
///
/// Score text samples with the Sentino API, compare several people trait by
/// trait, and write Markdown/JSON reports.
///
/// Examples:
///   sentino inventories
///   sentino score --text "I love meeting new people."
///   sentino compare --format json --output team.json
///   sentino compare --samples people.json --inventory big5
///   sentino --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Sentino API token
    ///
    /// Sent as `Authorization: Token <token>`. Overrides the config file.
    #[arg(long, env = "SENTINO_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API root URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sentino.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of scoring requests in flight during `compare`
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Fail when a result does not contain the requested inventory
    #[arg(long)]
    pub strict: bool,

    /// Leave bar charts out of reports
    #[arg(long)]
    pub no_charts: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sentino.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// What to do.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the inventories the service can score
    Inventories,

    /// Score a single text and print its profile
    Score {
        /// Text to score
        #[arg(short, long, required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text to score from a file
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Inventory to score against (default: from config, else big5)
        #[arg(short, long, value_name = "ID")]
        inventory: Option<String>,
    },

    /// Score several people and compare them trait by trait
    Compare {
        /// JSON file with an array of {"name", "text"} objects
        ///
        /// Uses the built-in demo samples when omitted.
        #[arg(short, long, value_name = "FILE")]
        samples: Option<PathBuf>,

        /// Inventory to compare on (default: from config, else big5)
        #[arg(short, long, value_name = "ID")]
        inventory: Option<String>,

        /// Output file path for the report (default: from config)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
    },
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
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

        if self.command.is_none() {
            return Err("A command is required: inventories, score or compare".to_string());
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err("Concurrency must be at least 1".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(Command::Score { text: Some(ref text), .. }) = self.command {
            if text.trim().is_empty() {
                return Err("Text to score must not be empty".to_string());
            }
        }

        if let Some(Command::Compare {
            samples: Some(ref path),
            ..
        }) = self.command
        {
            if !path.is_file() {
                return Err(format!("Samples file does not exist: {}", path.display()));
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
}
