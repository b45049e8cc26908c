//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.custlens.toml` files.

use crate::analysis::anomaly::AnomalySettings;
use crate::analysis::predict::PredictionSettings;
use crate::analysis::IncomeThresholds;
use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".custlens.toml";

/// Upper bound on simulated repository latency, in milliseconds.
pub const MAX_LATENCY_MS: u64 = 60_000;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Income segment thresholds.
    #[serde(default)]
    pub segments: SegmentConfig,

    /// Prediction ladder settings.
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// Anomaly detection settings.
    #[serde(default)]
    pub anomaly: AnomalyConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output file. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: ConfigFormat,
}

/// Report format as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    #[default]
    Markdown,
    Json,
}

impl From<OutputFormat> for ConfigFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => ConfigFormat::Markdown,
            OutputFormat::Json => ConfigFormat::Json,
        }
    }
}

/// Dataset settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON dataset file. The built-in reference dataset is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Simulated repository latency per call, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

/// Income thresholds for the value segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    #[serde(default = "default_mid_value_threshold")]
    pub mid_value_threshold: u64,

    #[serde(default = "default_high_value_threshold")]
    pub high_value_threshold: u64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            mid_value_threshold: default_mid_value_threshold(),
            high_value_threshold: default_high_value_threshold(),
        }
    }
}

fn default_mid_value_threshold() -> u64 {
    25_000
}

fn default_high_value_threshold() -> u64 {
    75_000
}

/// Nearest-neighbour prediction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Age window of the strict tier.
    #[serde(default = "default_age_tolerance")]
    pub age_tolerance: u32,

    /// Age window of the age-only fallback tier.
    #[serde(default = "default_broad_age_tolerance")]
    pub broad_age_tolerance: u32,

    /// Confidence reported by the fallback tier.
    #[serde(default = "default_broad_confidence")]
    pub broad_confidence: u32,

    /// Strict matches required for full confidence.
    #[serde(default = "default_full_confidence_matches")]
    pub full_confidence_matches: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            age_tolerance: default_age_tolerance(),
            broad_age_tolerance: default_broad_age_tolerance(),
            broad_confidence: default_broad_confidence(),
            full_confidence_matches: default_full_confidence_matches(),
        }
    }
}

fn default_age_tolerance() -> u32 {
    5
}

fn default_broad_age_tolerance() -> u32 {
    10
}

fn default_broad_confidence() -> u32 {
    30
}

fn default_full_confidence_matches() -> u32 {
    10
}

/// Anomaly detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Outlier band width in standard deviations.
    #[serde(default = "default_sigma")]
    pub sigma: f64,

    /// Gender income ratio that flags a division.
    #[serde(default = "default_disparity_ratio")]
    pub disparity_ratio: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            sigma: default_sigma(),
            disparity_ratio: default_disparity_ratio(),
        }
    }
}

fn default_sigma() -> f64 {
    2.0
}

fn default_disparity_ratio() -> f64 {
    1.5
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
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. Only values
    /// the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(format) = args.format {
            self.general.format = format.into();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref data) = args.data {
            self.data.path = Some(data.clone());
        }
        if let Some(latency) = args.latency_ms {
            self.data.latency_ms = latency;
        }

        if let Some(tolerance) = args.age_tolerance {
            self.prediction.age_tolerance = tolerance;
        }
    }

    /// Thresholds for [`crate::analysis::segment_by_income`].
    pub fn income_thresholds(&self) -> IncomeThresholds {
        IncomeThresholds {
            mid: self.segments.mid_value_threshold,
            high: self.segments.high_value_threshold,
        }
    }

    pub fn prediction_settings(&self) -> PredictionSettings {
        PredictionSettings {
            age_tolerance: self.prediction.age_tolerance,
            broad_age_tolerance: self.prediction.broad_age_tolerance,
            broad_confidence: self.prediction.broad_confidence,
            full_confidence_matches: self.prediction.full_confidence_matches,
        }
    }

    pub fn anomaly_settings(&self) -> AnomalySettings {
        AnomalySettings {
            sigma: self.anomaly.sigma,
            disparity_ratio: self.anomaly.disparity_ratio,
        }
    }

    /// Check values a config file may have set out of range.
    pub fn validate(&self) -> Result<(), String> {
        if self.segments.mid_value_threshold >= self.segments.high_value_threshold {
            return Err(format!(
                "mid_value_threshold ({}) must be below high_value_threshold ({})",
                self.segments.mid_value_threshold, self.segments.high_value_threshold
            ));
        }
        if self.prediction.age_tolerance == 0 || self.prediction.broad_age_tolerance == 0 {
            return Err("Age tolerances must be at least 1".to_string());
        }
        if self.prediction.broad_confidence > 100 {
            return Err("broad_confidence must be between 0 and 100".to_string());
        }
        if !(self.anomaly.sigma > 0.0) {
            return Err("Anomaly sigma must be positive".to_string());
        }
        if self.data.latency_ms > MAX_LATENCY_MS {
            return Err(format!(
                "latency_ms ({}) must not exceed {}",
                self.data.latency_ms, MAX_LATENCY_MS
            ));
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.segments.mid_value_threshold, 25_000);
        assert_eq!(config.segments.high_value_threshold, 75_000);
        assert_eq!(config.prediction.age_tolerance, 5);
        assert_eq!(config.prediction.broad_confidence, 30);
        assert_eq!(config.anomaly.sigma, 2.0);
        assert!(config.general.output.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "customers.md"
verbose = true
format = "json"

[segments]
high_value_threshold = 90000

[prediction]
age_tolerance = 3
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, Some(PathBuf::from("customers.md")));
        assert!(config.general.verbose);
        assert_eq!(config.general.format, ConfigFormat::Json);
        assert_eq!(config.segments.high_value_threshold, 90_000);
        assert_eq!(config.segments.mid_value_threshold, 25_000);
        assert_eq!(config.prediction.age_tolerance, 3);
        assert_eq!(config.prediction.broad_age_tolerance, 10);
        assert_eq!(config.anomaly, AnomalyConfig::default());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[segments]"));
        assert!(toml_str.contains("[prediction]"));
        assert!(toml_str.contains("[anomaly]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[data]\nlatency_ms = 250\n\n[anomaly]\nsigma = 3.0").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.data.latency_ms, 250);
        assert_eq!(config.anomaly_settings().sigma, 3.0);
        assert_eq!(config.anomaly_settings().disparity_ratio, 1.5);
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[segments\nmid_value_threshold = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.data.latency_ms = 100;
        config.general.format = ConfigFormat::Json;

        let args = Args::parse_from([
            "custlens",
            "--output",
            "out.md",
            "--age-tolerance",
            "7",
            "--format",
            "markdown",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.general.output, Some(PathBuf::from("out.md")));
        assert_eq!(config.general.format, ConfigFormat::Markdown);
        assert_eq!(config.prediction_settings().age_tolerance, 7);
        assert_eq!(config.data.latency_ms, 100);
    }

    #[test]
    fn test_invalid_thresholds() {
        let mut config = Config::default();
        config.segments.mid_value_threshold = 80_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_latency_cap_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[data]\nlatency_ms = 120000").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.data.latency_ms, 120_000);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.data.latency_ms = MAX_LATENCY_MS;
        assert!(config.validate().is_ok());
    }
}
