use crate::catalog::NearestStrategy;
use crate::platform::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Enable per-step debug logging
    pub debug: bool,
    /// Directory holding the marker, sponsor and team lists
    pub data_dir: PathBuf,
    /// Directory bundled icon assets are resolved against
    pub assets_dir: PathBuf,
    pub markers_file: String,
    pub sponsors_file: String,
    pub team_file: String,
    /// Continuous tracking parameters
    pub tracker: TrackerConfig,
    /// How "nearest site" lookups are answered
    pub nearest: NearestStrategy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debug: false,
            data_dir: PathBuf::from("settings"),
            assets_dir: PathBuf::from("assets"),
            markers_file: "markers.json".to_string(),
            sponsors_file: "sponsors.json".to_string(),
            team_file: "team.json".to_string(),
            tracker: TrackerConfig::default(),
            nearest: NearestStrategy::Fixed,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    Io { message: String },
    /// JSON serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

/// Outcome of validating an [`AppConfig`]
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn into_result(self) -> Result<(), ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Holds the active configuration and the file it came from
pub struct ConfigurationManager {
    config: AppConfig,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: AppConfig) -> Result<(), ConfigError> {
        Self::validate_config(&config).into_result()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Toggle debug logging
    pub fn set_debug(&mut self, debug: bool) {
        if self.config.debug != debug {
            self.config.debug = debug;
            self.is_modified = true;
        }
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
            message: format!("failed to parse config file '{}': {}", path_str, e),
        })?;

        let validation = Self::validate_config(&config);
        for warning in &validation.warnings {
            warn!(path = %path_str, "{}", warning);
        }
        validation.into_result()?;

        if config.debug {
            debug!(path = %path_str, "configuration loaded");
        }
        self.config = config;
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::Serialization {
            message: format!("failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write config file '{}': {}", path.display(), e),
        })?;

        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file last loaded or saved
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::Io {
                message: "no file path set for saving configuration".to_string(),
            }),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Check every parameter, collecting all errors and warnings
    pub fn validate_config(config: &AppConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let tracker = &config.tracker;

        if !(tracker.update_distance_m.is_finite() && tracker.update_distance_m > 0.0) {
            errors.push(ConfigError::InvalidParameter {
                parameter: "tracker.update_distance_m".to_string(),
                value: tracker.update_distance_m.to_string(),
                reason: "update distance must be positive".to_string(),
            });
        } else if tracker.update_distance_m > 1000.0 {
            warnings.push("update distance above 1 km makes tracking very coarse".to_string());
        }

        if tracker.update_time_ms == 0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "tracker.update_time_ms".to_string(),
                value: tracker.update_time_ms.to_string(),
                reason: "update interval must be positive".to_string(),
            });
        }

        if tracker.minimum_update_time_ms == 0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "tracker.minimum_update_time_ms".to_string(),
                value: tracker.minimum_update_time_ms.to_string(),
                reason: "minimum update interval must be positive".to_string(),
            });
        } else if tracker.minimum_update_time_ms > tracker.update_time_ms {
            errors.push(ConfigError::InvalidParameter {
                parameter: "tracker.minimum_update_time_ms".to_string(),
                value: tracker.minimum_update_time_ms.to_string(),
                reason: format!(
                    "minimum update interval exceeds update interval of {} ms",
                    tracker.update_time_ms
                ),
            });
        }

        for (parameter, name) in [
            ("markers_file", &config.markers_file),
            ("sponsors_file", &config.sponsors_file),
            ("team_file", &config.team_file),
        ] {
            if name.trim().is_empty() {
                errors.push(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: name.clone(),
                    reason: "file name must not be empty".to_string(),
                });
            }
        }

        if config.nearest == NearestStrategy::Fixed {
            warnings.push("nearest lookups return a fixed coordinate".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
