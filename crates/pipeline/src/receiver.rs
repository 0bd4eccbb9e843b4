//! Receive-side orchestration
//!
//! The receiver runs the transmit stages in reverse: demodulation,
//! deframing, error detection, optional Hamming repair, then the printable
//! text extraction. Every path is best-effort; corrupt input degrades the
//! recovered text and raises the diagnostics, it never aborts.

use crate::phy::PhyModem;
use linklab_core::bits::{bits_to_text, bytes_to_bits};
use linklab_frame::detect::Detector;
use linklab_frame::framing::Framer;
use linklab_frame::hamming::Hamming;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of one pass through the receive pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reception {
    /// Recovered message, reduced to printable ASCII.
    pub text: String,
    /// Whether the error detector saw a redundancy mismatch.
    pub error_detected: bool,
    /// Hamming blocks that needed a single-bit repair (0 without Hamming).
    pub corrected_blocks: usize,
}

/// End-to-end receive pipeline.
#[derive(Debug, Clone)]
pub struct Receiver {
    modem: PhyModem,
    framer: Framer,
    detector: Detector,
    hamming: Option<Hamming>,
}

impl Receiver {
    /// Assemble a receive pipeline from its stages. The stages must mirror
    /// the transmitter's, or the recovered payload is garbage.
    pub fn new(
        modem: PhyModem,
        framer: Framer,
        detector: Detector,
        hamming: Option<Hamming>,
    ) -> Self {
        Self {
            modem,
            framer,
            detector,
            hamming,
        }
    }

    /// Run a received signal through every stage and surface the recovered
    /// text together with the layer diagnostics.
    pub fn receive(&self, signal: &[f64]) -> Reception {
        debug!(samples = signal.len(), "rx: signal");

        let wire = self.modem.decode(signal);
        debug!(
            modem = self.modem.describe(),
            wire_bits = wire.len(),
            "rx: demodulated"
        );

        let deframed = self.framer.deframe(&wire);
        debug!(bytes = deframed.len(), "rx: deframed");

        let (data, error_detected) = self.detector.verify(&deframed);
        if error_detected {
            warn!(scheme = ?self.detector.scheme(), "rx: error detected");
        }

        let (bytes, corrected_blocks) = match &self.hamming {
            Some(hamming) => {
                let (bytes, corrected) = hamming.verify(&bytes_to_bits(&data));
                if corrected > 0 {
                    info!(blocks = corrected, "rx: hamming repaired blocks");
                }
                (bytes, corrected)
            }
            None => (data, 0),
        };

        let text = bits_to_text(&bytes_to_bits(&bytes));
        info!(chars = text.len(), error_detected, corrected_blocks, "rx: done");
        Reception {
            text,
            error_detected,
            corrected_blocks,
        }
    }
}
