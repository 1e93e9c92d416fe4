//! Sentino - personality scoring from text
//!
//! A CLI that scores text with the Sentino API, compares several people
//! trait by trait, and writes Markdown or JSON reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (configuration, connection, API, malformed response)

use anyhow::{bail, Context, Result};
use chrono::Utc;
use sentino_client::batch::{self, BatchOptions, BatchRunner};
use sentino_client::cli::{Args, Command, OutputFormat};
use sentino_client::client::{HttpTransport, Scorer, TransportConfig};
use sentino_client::config::{Config, CONFIG_FILE_NAME};
use sentino_client::models::{ComparisonReport, ReportMetadata, Sample};
use sentino_client::report::{self, RenderOptions};
use sentino_client::{analysis, ScoringResult};
use std::path::{Path, PathBuf};
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

    init_logging(&args);

    info!("Sentino client v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command: {:?}", args.command);

    if let Err(e) = run(args).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .sentino.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set SENTINO_API_TOKEN (or api.token) before scoring.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so printed profiles stay clean on stdout.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
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

/// Dispatch the requested command.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let Some(command) = args.command.clone() else {
        bail!("No command given");
    };

    let scorer = build_scorer(&config)?;

    match command {
        Command::Inventories => handle_inventories(&scorer).await,
        Command::Score {
            text,
            file,
            inventory,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read text file: {}", path.display()))?,
                (None, None) => bail!("Nothing to score: pass --text or --file"),
            };
            handle_score(&scorer, &config, &text, inventory).await
        }
        Command::Compare {
            samples,
            inventory,
            output,
            format,
        } => {
            let inventory = inventory.unwrap_or_else(|| config.primary_inventory().to_string());
            let samples = match samples {
                Some(path) => batch::load_samples(&path)?,
                None => batch::demo_samples(),
            };
            handle_compare(&scorer, &config, &args, samples, &inventory, output, format).await
        }
    }
}

/// Build the scorer from the merged configuration.
fn build_scorer(config: &Config) -> Result<Scorer<HttpTransport>> {
    let has_token = config
        .api
        .token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());
    if !has_token {
        bail!(
            "No API token. Set SENTINO_API_TOKEN, pass --token, or add api.token to {}",
            CONFIG_FILE_NAME
        );
    }

    let transport = HttpTransport::new(TransportConfig::from(&config.api))
        .context("Failed to set up HTTP transport")?;

    let scorer = Scorer::new(transport);
    if config.scoring.inventories.is_empty() {
        warn!("No inventories configured, using the default");
        Ok(scorer)
    } else {
        Ok(scorer.with_default_inventories(config.scoring.inventories.clone()))
    }
}

/// List the inventories offered by the service.
async fn handle_inventories(scorer: &Scorer<HttpTransport>) -> Result<()> {
    println!("📚 Fetching inventories from {}", scorer.transport().base_url());

    let inventories = scorer.list_inventories().await?;

    println!("\n   Found {} inventories:\n", inventories.len());
    for inventory in &inventories {
        println!("     • {}", inventory);
        if let Some(ref reference) = inventory.reference {
            println!("       {}", reference);
        }
    }

    Ok(())
}

/// Score one text and print a profile per inventory.
async fn handle_score(
    scorer: &Scorer<HttpTransport>,
    config: &Config,
    text: &str,
    inventory: Option<String>,
) -> Result<()> {
    println!("🔬 Scoring {} characters of text...", text.chars().count());

    let (result, inventories): (ScoringResult, Vec<String>) = match inventory {
        Some(inventory) => {
            let result = scorer.score(text, std::slice::from_ref(&inventory)).await?;
            (result, vec![inventory])
        }
        None => {
            let result = scorer.score_default(text).await?;
            (result, scorer.default_inventories().to_vec())
        }
    };

    let options = RenderOptions::from(&config.report);
    for inventory in &inventories {
        let profile = if config.scoring.strict_inventory {
            analysis::normalize_strict(&result, inventory)?
        } else {
            analysis::normalize(&result, inventory)
        };

        println!("\n## {} Personality Profile\n", inventory.to_uppercase());
        print!("{}", report::generate_profile_table(&profile));
        if options.include_charts && !profile.is_empty() {
            print!("{}", report::render_bar_chart(&profile, options.chart_width));
        }
    }

    Ok(())
}

/// Score several samples, compare them and write a report.
async fn handle_compare(
    scorer: &Scorer<HttpTransport>,
    config: &Config,
    args: &Args,
    samples: Vec<Sample>,
    inventory: &str,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let start_time = Instant::now();

    println!(
        "🔬 Scoring {} samples against `{}`...",
        samples.len(),
        inventory
    );

    let options = BatchOptions {
        strict_inventory: config.scoring.strict_inventory,
        concurrency: config.scoring.concurrency,
        show_progress: !args.quiet,
    };
    let subjects = BatchRunner::new(scorer, options)
        .run(&samples, inventory)
        .await
        .context("Batch scoring failed")?;

    let metadata = ReportMetadata {
        inventory: inventory.to_string(),
        base_url: config.api.base_url.clone(),
        generated_at: Utc::now(),
        samples_scored: subjects.len(),
        duration_seconds: start_time.elapsed().as_secs_f64(),
    };
    let report = ComparisonReport::build(metadata, subjects);

    println!("\n📝 Generating report...");
    let content = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &RenderOptions::from(&config.report))
        }
    };

    let output_path = output.unwrap_or_else(|| default_output_path(config, format));
    std::fs::write(&output_path, &content)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Comparison Summary:");
    println!("   People compared: {}", report.table.len());
    println!("   Traits: {}", report.table.trait_columns().len());
    if !report.leaders.is_empty() {
        println!("\n   Highest scorers:");
        for leader in &report.leaders {
            println!("   - {}", leader);
        }
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);
    println!("\n✅ Report saved to: {}", output_path.display());

    Ok(())
}

/// Configured output path, with the extension matching `format`.
fn default_output_path(config: &Config, format: OutputFormat) -> PathBuf {
    let path = PathBuf::from(&config.report.output);
    match format {
        OutputFormat::Json => path.with_extension("json"),
        OutputFormat::Markdown => path,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
