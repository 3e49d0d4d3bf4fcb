//! Configuration management for the fraud stream monitor

use crate::error::MonitorError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `FRAUD_MONITOR__MODEL__CONTAMINATION`
pub const ENV_PREFIX: &str = "FRAUD_MONITOR";

/// Dashboard rendering mode
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenterFormat {
    /// Text tables and a sparkline on stdout
    #[default]
    Table,
    /// One JSON snapshot per tick on stdout
    Json,
    /// Nothing is rendered; the history is still kept
    None,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub model: ModelConfig,
    pub history: HistoryConfig,
    pub presentation: PresentationConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// Synthetic transaction stream configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub amount_min: f64,
    pub amount_max: f64,
    pub balance_min: f64,
    pub balance_max: f64,
    /// Pause between ticks in milliseconds
    pub tick_interval_ms: u64,
    /// Seed for the transaction generator; OS entropy when unset
    pub seed: Option<u64>,
    /// Stop after this many ticks; run until interrupted when unset
    pub max_ticks: Option<u64>,
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            amount_min: 1.0,
            amount_max: 10_000.0,
            balance_min: 100.0,
            balance_max: 50_000.0,
            tick_interval_ms: 2000,
            seed: None,
            max_ticks: None,
        }
    }
}

/// Anomaly model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Expected fraction of outliers in the training sample
    pub contamination: f64,
    /// Size of the synthetic reference sample
    pub training_samples: usize,
    /// Number of isolation trees
    pub n_estimators: usize,
    /// Subsample size per tree (capped at the sample size)
    pub max_samples: usize,
    /// Seed for reference sampling and tree growth; OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            contamination: 0.02,
            training_samples: 1000,
            n_estimators: 100,
            max_samples: 256,
            seed: Some(42),
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum retained entries; unbounded when unset
    pub capacity: Option<usize>,
}

/// Dashboard configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub format: PresenterFormat,
    /// Rows shown in the latest transactions table
    pub latest_rows: usize,
    /// Rows shown in the recent fraud table
    pub recent_frauds: usize,
    /// Number of points drawn in the trend sparkline
    pub trend_width: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            format: PresenterFormat::Table,
            latest_rows: 10,
            recent_frauds: 5,
            trend_width: 60,
        }
    }
}

/// Driver loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Log a progress line every N ticks (0 disables it)
    pub summary_every_ticks: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            summary_every_ticks: 50,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file plus environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path plus environment overrides.
    ///
    /// A missing file is not an error: every field has a default.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app.validate().context("Configuration rejected")?;
        Ok(app)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> std::result::Result<(), MonitorError> {
        let sim = &self.simulation;
        check_range("simulation.amount", sim.amount_min, sim.amount_max)?;
        check_range("simulation.balance", sim.balance_min, sim.balance_max)?;

        let model = &self.model;
        if !(model.contamination > 0.0 && model.contamination <= 0.5) {
            return Err(MonitorError::invalid_config(
                "model.contamination",
                "must be in (0, 0.5]",
            ));
        }
        if model.training_samples < 2 {
            return Err(MonitorError::invalid_config(
                "model.training_samples",
                "must be at least 2",
            ));
        }
        if model.n_estimators == 0 {
            return Err(MonitorError::invalid_config(
                "model.n_estimators",
                "must be positive",
            ));
        }
        if model.max_samples < 2 {
            return Err(MonitorError::invalid_config(
                "model.max_samples",
                "must be at least 2",
            ));
        }

        if self.history.capacity == Some(0) {
            return Err(MonitorError::invalid_config(
                "history.capacity",
                "must be positive when set",
            ));
        }

        let presentation = &self.presentation;
        if presentation.latest_rows == 0 || presentation.recent_frauds == 0 {
            return Err(MonitorError::invalid_config(
                "presentation",
                "latest_rows and recent_frauds must be positive",
            ));
        }

        Ok(())
    }
}

/// Reject ranges a uniform distribution cannot sample from.
///
/// The span `max - min` must itself be finite: bounds such as
/// `[-1e308, 1e308]` are each finite but their width overflows.
pub(crate) fn check_range(field: &str, min: f64, max: f64) -> std::result::Result<(), MonitorError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(MonitorError::invalid_config(field, "bounds must be finite"));
    }
    if min > max {
        return Err(MonitorError::invalid_config(
            field,
            format!("min {} exceeds max {}", min, max),
        ));
    }
    if !(max - min).is_finite() {
        return Err(MonitorError::invalid_config(
            field,
            format!("span of [{}, {}] overflows", min, max),
        ));
    }
    Ok(())
}
