//! # Error Types
//!
//! Custom error types for Gamepad Calibrator using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Gamepad Calibrator
#[derive(Debug, Error)]
pub enum CalibratorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Input device errors
    #[error("Input device error: {0}")]
    Input(String),

    /// No joystick-like device was found on the system
    #[error("No joystick device found")]
    JoystickNotFound,

    /// The calibration file could not be created
    #[error("Could not create calibration file {}", path.display())]
    MappingFileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The calibration file could not be written
    #[error("Could not write calibration file {}", path.display())]
    MappingFileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gamepad Calibrator
pub type Result<T> = std::result::Result<T, CalibratorError>;
