//! LinkLab Frame - data-link layer codecs
//!
//! This crate provides the three data-link transforms of the simulator:
//! frame delimiting, error detection and Hamming single-error correction.
//! Each codec is pure; the receive side never fails, it returns best-effort
//! payloads plus a diagnostic (mismatch flag, syndrome or repair count).

pub mod detect;
pub mod error;
pub mod framing;
pub mod hamming;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        detect::{CrcWidth, Detection, Detector},
        error::{FrameError, Result},
        framing::{Framer, Framing},
        hamming::Hamming,
    };
}
