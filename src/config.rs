//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub wizard: WizardConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

/// File path configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_calibration_file")]
    pub calibration_file: String,
}

/// Wizard timing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WizardConfig {
    #[serde(default = "default_hold_seconds")]
    pub hold_seconds: f32,

    #[serde(default = "default_axis_threshold")]
    pub axis_threshold: f32,
}

/// Input polling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_poll_rate_hz")]
    pub poll_rate_hz: u32,
}

/// Preview logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_enabled")]
    pub enabled: bool,

    #[serde(default = "default_preview_log_interval_ms")]
    pub log_interval_ms: u64,
}

// Default value functions
fn default_calibration_file() -> String { "joystick-mapping.properties".to_string() }

fn default_hold_seconds() -> f32 { 1.0 }
fn default_axis_threshold() -> f32 { 0.5 }

fn default_poll_rate_hz() -> u32 { 120 }

fn default_preview_enabled() -> bool { true }
fn default_preview_log_interval_ms() -> u64 { 500 }

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            calibration_file: default_calibration_file(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            hold_seconds: default_hold_seconds(),
            axis_threshold: default_axis_threshold(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_rate_hz: default_poll_rate_hz(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: default_preview_enabled(),
            log_interval_ms: default_preview_log_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files: FilesConfig::default(),
            wizard: WizardConfig::default(),
            input: InputConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_calibrator::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.files.calibration_file.is_empty() {
            return Err(crate::error::CalibratorError::Config(
                toml::de::Error::custom("calibration_file cannot be empty")
            ));
        }

        if self.wizard.hold_seconds < 0.1 || self.wizard.hold_seconds > 10.0 {
            return Err(crate::error::CalibratorError::Config(
                toml::de::Error::custom("hold_seconds must be between 0.1 and 10.0")
            ));
        }

        if self.wizard.axis_threshold < 0.05 || self.wizard.axis_threshold > 0.95 {
            return Err(crate::error::CalibratorError::Config(
                toml::de::Error::custom("axis_threshold must be between 0.05 and 0.95")
            ));
        }

        if self.input.poll_rate_hz == 0 || self.input.poll_rate_hz > 1000 {
            return Err(crate::error::CalibratorError::Config(
                toml::de::Error::custom("poll_rate_hz must be between 1 and 1000")
            ));
        }

        if self.preview.log_interval_ms == 0 || self.preview.log_interval_ms > 60000 {
            return Err(crate::error::CalibratorError::Config(
                toml::de::Error::custom("log_interval_ms must be between 1 and 60000")
            ));
        }

        Ok(())
    }
}
