//! custlens - customer analytics from the command line
//!
//! Loads a customer dataset, applies any requested repository actions
//! and filters, and renders one dashboard view as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, dataset, output)
//!   2 - A requested update, lookup or delete named an unknown customer

mod analysis;
mod cli;
mod config;
mod data;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, ConfigFormat, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use report::{Document, ReportMetadata, ViewSettings};
use std::path::Path;
use std::time::Duration;
use store::{ActionOutcome, CustomerRepository, InMemoryRepository};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const REFERENCE_SOURCE: &str = "built-in reference dataset";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let (mut config, config_warning) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    if let Err(e) = config.validate() {
        eprintln!("Error: invalid configuration: {}", e);
        std::process::exit(1);
    }

    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    init_logging(level);

    info!("custlens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }

    match run(args, config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Report failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: write a default config file to the current directory.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the dataset, segment thresholds and prediction tiers.");
    Ok(())
}

/// Logs go to stderr so a report printed to stdout stays parseable.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` that cannot be read is an error. A broken default
/// file only produces a warning, returned so it can be logged once logging
/// is up.
fn load_config(args: &Args) -> Result<(Config, Option<String>)> {
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, None));
    }

    match Config::load_default() {
        Ok(Some(config)) => Ok((config, None)),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => Ok((
            Config::default(),
            Some(format!("Failed to load {}: {:#}", DEFAULT_CONFIG_FILE, e)),
        )),
    }
}

/// Build and write the report. Returns exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let (customers, source) = match config.data.path {
        Some(ref path) => {
            info!("Loading dataset from: {}", path.display());
            let customers = data::load_customers(path)?;
            (customers, path.display().to_string())
        }
        None => {
            debug!("No dataset given, using the reference dataset");
            (data::reference_customers(), REFERENCE_SOURCE.to_string())
        }
    };
    info!("Loaded {} customers", customers.len());

    let repo = InMemoryRepository::new(customers)
        .with_latency(Duration::from_millis(config.data.latency_ms));

    let outcome = if args.has_repository_actions() {
        run_actions(&repo, &args).await
    } else {
        ActionOutcome::default()
    };

    let customers = repo.list().await;
    let criteria = args.filter_criteria();
    let selected = analysis::filter_customers(&customers, &criteria);
    if !criteria.is_empty() {
        info!(
            "Filter {} matched {} of {} customers",
            criteria.describe(),
            selected.len(),
            customers.len()
        );
    }

    let settings = ViewSettings {
        thresholds: config.income_thresholds(),
        prediction: config.prediction_settings(),
        anomaly: config.anomaly_settings(),
        query: args.prediction_query(),
    };
    let view_data = report::build_view(args.view, &selected, &settings);

    let mut metadata =
        ReportMetadata::new(args.view, source, criteria.describe(), selected.len());
    metadata.deleted = outcome.deleted.clone();
    let document = Document::new(metadata, view_data).with_lookups(outcome.found.clone());

    let output = match config.general.format {
        ConfigFormat::Json => report::generate_json_report(&document)?,
        ConfigFormat::Markdown => report::generate_markdown_report(&document),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    if !outcome.all_found() {
        eprintln!(
            "\n⛔ Unknown customer ids: {}. Failing (exit code 2).",
            outcome.missing.join(", ")
        );
        return Ok(2);
    }

    Ok(0)
}

/// Apply --update, --lookup and --delete with a spinner on stderr.
async fn run_actions(repo: &dyn CustomerRepository, args: &Args) -> ActionOutcome {
    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!(
        "Applying {} update(s), {} lookup(s), {} delete(s)...",
        args.update.len(),
        args.lookup.len(),
        args.delete.len()
    ));

    let outcome = store::apply_actions(repo, &args.update, &args.lookup, &args.delete).await;

    spinner.finish_and_clear();
    info!(
        "Updated {}, found {}, deleted {}, missing {}",
        outcome.updated.len(),
        outcome.found.len(),
        outcome.deleted.len(),
        outcome.missing.len()
    );
    outcome
}
