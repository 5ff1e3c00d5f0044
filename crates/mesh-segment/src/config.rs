//! Loading and saving sweep configurations.
//!
//! A [`SweepConfig`] can be stored as TOML or JSON so that a segmentation is
//! reproducible from a file. Every field is optional; missing fields take the
//! reference values.
//!
//! # Example TOML
//!
//! ```toml
//! eps_min = 0.001
//! eps_max = 20.0
//! eps_step = 0.1
//! scope = "closed"
//! parallel_sweeps = true
//!
//! # pi/36, pi/18, pi/2
//! theta_max_pi_divisors = [36.0, 18.0, 2.0]
//! ```

use std::path::Path;

use tracing::debug;

use crate::error::SegmentError;
use crate::sweep::SweepConfig;

impl SweepConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, doesn't match the schema, or
    /// describes an invalid radius range or tolerance.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or its contents are
    /// rejected by [`from_toml`](Self::from_toml).
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        debug!("Loaded sweep configuration from {}", path.display());
        Self::from_toml(&contents)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors that can occur when loading or saving sweep configurations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but describes invalid parameters.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SegmentError),
}
