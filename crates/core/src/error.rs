//! Error types for LinkLab Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: f64 },

    #[error("Invalid bit rate: {rate}")]
    InvalidBitRate { rate: f64 },

    #[error("Invalid amplitude: {value}")]
    InvalidAmplitude { value: f64 },

    #[error("Invalid noise level: {sigma}")]
    InvalidNoiseLevel { sigma: f64 },
}

/// Result type for LinkLab Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
