//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::predict::PredictionQuery;
use crate::config::MAX_LATENCY_MS;
use crate::models::{FilterCriteria, Gender, MaritalStatus};
use crate::store::CustomerUpdate;
use clap::Parser;
use std::path::PathBuf;

/// custlens - customer analytics from the command line
///
/// Summarise, segment and profile a customer dataset and render the
/// results as Markdown or JSON.
///
/// Examples:
///   custlens
///   custlens --view segments --division Dhaka
///   custlens --view analytics --predict-age 36 --predict-gender F --predict-marital-status married
///   custlens --view report --format json -o report.json
///   custlens --data customers.json --lookup BU79786 --delete QZ44356
///   custlens --update '{"id": "QZ44356", "income": 31000}' --lookup QZ44356
///   custlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dashboard view to render
    #[arg(long, default_value = "overview", value_name = "VIEW")]
    pub view: View,

    /// Output format (markdown, json)
    ///
    /// Defaults to the config file setting, then markdown.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report
    ///
    /// The report is written to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON dataset to load instead of the built-in reference dataset
    #[arg(long, value_name = "FILE", env = "CUSTLENS_DATA")]
    pub data: Option<PathBuf>,

    /// Only include customers from this division
    #[arg(long, value_name = "NAME")]
    pub division: Option<String>,

    /// Only include customers of this gender (M or F)
    #[arg(long, value_name = "GENDER")]
    pub gender: Option<Gender>,

    /// Only include customers with this marital status
    #[arg(long, value_name = "STATUS")]
    pub marital_status: Option<MaritalStatus>,

    /// Age of the profile to predict an income for
    #[arg(long, default_value = "30", value_name = "AGE")]
    pub predict_age: u32,

    /// Gender of the profile to predict an income for
    #[arg(long, default_value = "M", value_name = "GENDER")]
    pub predict_gender: Gender,

    /// Marital status of the profile to predict an income for
    #[arg(long, default_value = "single", value_name = "STATUS")]
    pub predict_marital_status: MaritalStatus,

    /// Age window of the strict prediction tier, in years
    ///
    /// Default: from config or 5.
    #[arg(long, value_name = "YEARS")]
    pub age_tolerance: Option<u32>,

    /// Update a customer before rendering (repeatable)
    ///
    /// Takes a JSON object with the id and the fields to change, e.g.
    /// '{"id": "BU79786", "income": 60000}'.
    #[arg(long, value_name = "JSON", value_parser = parse_update)]
    pub update: Vec<CustomerUpdate>,

    /// Look up a customer by id (repeatable)
    #[arg(long, value_name = "ID")]
    pub lookup: Vec<String>,

    /// Delete a customer by id before rendering (repeatable)
    #[arg(long, value_name = "ID")]
    pub delete: Vec<String>,

    /// Simulated repository latency per call, in milliseconds
    #[arg(long, value_name = "MS")]
    pub latency_ms: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .custlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .custlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
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

/// Dashboard view to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Headline metrics and distributions
    #[default]
    Overview,
    /// Income-value and age segments
    Segments,
    /// Gender, age, income and marital breakdowns
    Demographics,
    /// Correlation, trends, anomalies, divisions and predictions
    Analytics,
    /// Executive summary, key metrics, segments, regions and recommendations
    Report,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Segments => "Customer Segments",
            View::Demographics => "Demographics",
            View::Analytics => "Analytics",
            View::Report => "Customer Report",
        }
    }
}

fn parse_update(value: &str) -> Result<CustomerUpdate, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid customer update: {}", e))
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

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if !(18..=100).contains(&self.predict_age) {
            return Err("Prediction age must be between 18 and 100".to_string());
        }

        if self.age_tolerance == Some(0) {
            return Err("Age tolerance must be at least 1 year".to_string());
        }

        if self
            .lookup
            .iter()
            .chain(self.delete.iter())
            .chain(self.update.iter().map(|u| &u.id))
            .any(|id| id.trim().is_empty())
        {
            return Err("Customer ids for --update, --lookup and --delete must not be empty".to_string());
        }

        if let Some(age) = self
            .update
            .iter()
            .filter_map(|u| u.age)
            .find(|age| !(18..=100).contains(age))
        {
            return Err(format!("Updated age {} must be between 18 and 100", age));
        }

        if self.latency_ms.map_or(false, |ms| ms > MAX_LATENCY_MS) {
            return Err(format!("Latency must not exceed {} ms", MAX_LATENCY_MS));
        }

        if let Some(ref data) = self.data {
            if !data.is_file() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
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

    /// Whether any update, lookup or delete was requested.
    pub fn has_repository_actions(&self) -> bool {
        !(self.update.is_empty() && self.lookup.is_empty() && self.delete.is_empty())
    }

    /// Filter built from `--division`, `--gender` and `--marital-status`.
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            division: self.division.clone(),
            gender: self.gender,
            marital_status: self.marital_status,
            ..Default::default()
        }
    }

    pub fn prediction_query(&self) -> PredictionQuery {
        PredictionQuery {
            age: self.predict_age,
            gender: self.predict_gender,
            marital_status: self.predict_marital_status,
        }
    }
}
