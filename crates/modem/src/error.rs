//! Error types for LinkLab Modem

use thiserror::Error;

/// Modem error types
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Invalid modulation parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Core error: {0}")]
    Core(#[from] linklab_core::CoreError),
}

/// Result type for LinkLab Modem operations
pub type Result<T> = std::result::Result<T, ModemError>;
