//! Error types for LinkLab Pipeline

use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid noise level: {sigma}")]
    InvalidNoiseLevel { sigma: f64 },

    #[error("Core error: {0}")]
    Core(#[from] linklab_core::CoreError),

    #[error("Modem error: {0}")]
    Modem(#[from] linklab_modem::ModemError),

    #[error("Frame error: {0}")]
    Frame(#[from] linklab_frame::FrameError),
}

/// Result type for LinkLab Pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
