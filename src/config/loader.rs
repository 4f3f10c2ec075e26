//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the guard
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{GuardConfig, PolicyConfig, ScoreTable};

/// Loads and provides access to the guard configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── policy.yaml   # Fraud check thresholds
/// └── scores.yaml   # Score table and default score
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_guard::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Geofence: {}m", loader.policy().end_geofence_meters);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: GuardConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A threshold is out of range
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<PolicyConfig>(&path.join("policy.yaml"))?;
        let scores = Self::load_yaml::<ScoreTable>(&path.join("scores.yaml"))?;
        Self::validate(&policy)?;

        Ok(Self {
            config: GuardConfig::new(policy, scores),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(policy: &PolicyConfig) -> EngineResult<()> {
        let checks: [(&str, bool, &str); 7] = [
            ("min_shift_minutes", policy.min_shift_minutes >= 0, "must not be negative"),
            ("end_geofence_meters", policy.end_geofence_meters > 0.0, "must be positive"),
            ("relocation_alert_km", policy.relocation_alert_km > 0.0, "must be positive"),
            ("tracking_interval_seconds", policy.tracking_interval_seconds > 0, "must be positive"),
            ("max_speed_kmh", policy.max_speed_kmh > 0.0, "must be positive"),
            ("max_adjustment_hours", policy.max_adjustment_hours > 0, "must be positive"),
            ("standard_shift_minutes", policy.standard_shift_minutes > 0, "must be positive"),
        ];

        match checks.iter().find(|(_, ok, _)| !ok) {
            Some((field, _, message)) => Err(EngineError::InvalidConfig {
                field: field.to_string(),
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns the underlying guard configuration.
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Returns the fraud check thresholds.
    pub fn policy(&self) -> &PolicyConfig {
        self.config.policy()
    }

    /// Returns the score table.
    pub fn scores(&self) -> &ScoreTable {
        self.config.scores()
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> GuardConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreKey;

    fn config_path() -> &'static str {
        "./config/default"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.policy(), &PolicyConfig::default());
        assert_eq!(loader.scores(), &ScoreTable::default());
    }

    #[test]
    fn test_loaded_scores() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(loader.scores().score(Some(ScoreKey::SpeedImpossible)), 40);
        assert_eq!(loader.scores().score(None), 10);
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("policy.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let policy = PolicyConfig {
            tracking_interval_seconds: 0,
            ..PolicyConfig::default()
        };

        match ConfigLoader::validate(&policy) {
            Err(EngineError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "tracking_interval_seconds");
            }
            _ => panic!("Expected InvalidConfig error"),
        }
    }

    #[test]
    fn test_negative_minimum_shift_is_rejected() {
        let policy = PolicyConfig {
            min_shift_minutes: -1,
            ..PolicyConfig::default()
        };

        match ConfigLoader::validate(&policy) {
            Err(EngineError::InvalidConfig { field, message }) => {
                assert_eq!(field, "min_shift_minutes");
                assert_eq!(message, "must not be negative");
            }
            _ => panic!("Expected InvalidConfig error"),
        }

        let no_minimum = PolicyConfig {
            min_shift_minutes: 0,
            ..PolicyConfig::default()
        };
        assert!(ConfigLoader::validate(&no_minimum).is_ok());
    }

    #[test]
    fn test_default_loader_matches_files() {
        let from_disk = ConfigLoader::load(config_path()).unwrap();
        assert_eq!(from_disk.config(), ConfigLoader::default().config());
    }
}
