//! Configuration loading, config file resolution and validation

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TRIAGE_CONFIG";

/// Application directory name under the platform config dir
const APP_DIR: &str = "ticket-triage";

/// Top-level TOML configuration
///
/// Every section and key is optional; absent values take compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub routing: RoutingThresholds,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Classifier artifact location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("models/ticket_classifier.json"),
        }
    }
}

/// Confidence thresholds driving the routing policy
///
/// - confidence > `auto_resolve_threshold` → auto-resolve
/// - `human_review_threshold` ≤ confidence ≤ `auto_resolve_threshold` → auto-route
/// - confidence < `human_review_threshold` → human review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingThresholds {
    pub auto_resolve_threshold: f64,
    pub human_review_threshold: f64,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            auto_resolve_threshold: 0.8,
            human_review_threshold: 0.6,
        }
    }
}

impl RoutingThresholds {
    /// Both thresholds in [0, 1] and review ≤ resolve
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("auto_resolve_threshold", self.auto_resolve_threshold),
            ("human_review_threshold", self.human_review_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.human_review_threshold > self.auto_resolve_threshold {
            return Err(Error::Config(format!(
                "human_review_threshold ({}) must not exceed auto_resolve_threshold ({})",
                self.human_review_threshold, self.auto_resolve_threshold
            )));
        }

        Ok(())
    }
}

/// Prediction history retention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Maximum retained prediction records; 0 keeps every record
    pub history_capacity: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            history_capacity: 10_000,
        }
    }
}

impl MetricsConfig {
    /// Capacity as an optional bound (`None` = unbounded)
    pub fn capacity_limit(&self) -> Option<usize> {
        (self.history_capacity > 0).then_some(self.history_capacity)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.routing.validate()?;
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Config file resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config file, if present
///
/// Returns `None` when no candidate applies; callers fall back to compiled
/// defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    default_config_file()
}

/// Platform default config file, if one exists on disk
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load configuration from `path`
///
/// A missing path or missing file is not fatal: a warning is logged and
/// compiled defaults are returned. A file that exists but fails to parse or
/// validate is an error.
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = TomlConfig::from_toml_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
