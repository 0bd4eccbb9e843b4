//! Error types for LinkLab Frame

use thiserror::Error;

/// Data-link layer error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Frame payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid Hamming block size: {size} data bits")]
    InvalidBlockSize { size: usize },
}

/// Result type for LinkLab Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
