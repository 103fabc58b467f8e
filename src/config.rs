//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Registry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Defaults applied to newly added participants.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Size limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Defaults applied to newly added participants.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Permission level assigned to new participants (default: 5).
    #[serde(default = "default_level")]
    pub level: u8,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Size limits configuration.
///
/// Rooms are expected to hold tens to low hundreds of participants, so
/// the threshold only triggers a log warning; nothing is ever rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Participant count above which each add logs a warning (default: 500).
    #[serde(default = "default_participant_warn_threshold")]
    pub participant_warn_threshold: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            participant_warn_threshold: default_participant_warn_threshold(),
        }
    }
}

fn default_level() -> u8 {
    5
}

fn default_participant_warn_threshold() -> usize {
    500
}

impl RegistryConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: RegistryConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
