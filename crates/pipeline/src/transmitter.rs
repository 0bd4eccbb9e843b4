//! Transmit-side orchestration
//!
//! The transmitter sequences the layer codecs in the fixed order
//! text -> bits -> Hamming (optional) -> error detection -> framing ->
//! modulation. It owns no algorithm of its own; each stage is one call
//! into the owning crate, with the stage transitions logged.

use crate::phy::PhyModem;
use crate::Result;
use linklab_core::bits::bits_to_bytes_padded;
use linklab_frame::detect::Detector;
use linklab_frame::framing::Framer;
use linklab_frame::hamming::Hamming;
use tracing::{debug, info};

/// End-to-end transmit pipeline.
#[derive(Debug, Clone)]
pub struct Transmitter {
    modem: PhyModem,
    framer: Framer,
    detector: Detector,
    hamming: Option<Hamming>,
}

impl Transmitter {
    /// Assemble a transmit pipeline from its stages. Passing `None` for
    /// `hamming` skips forward error correction entirely.
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

    /// Run a message through every transmit stage and return the modulated
    /// signal. Empty input flows through and produces a frame around an
    /// empty payload; the only failure is an oversize frame.
    pub fn transmit(&self, message: &str) -> Result<Vec<f64>> {
        let bytes = message.as_bytes();
        debug!(chars = message.len(), bits = bytes.len() * 8, "tx: message");

        // Hamming speaks bits; the detector and framer speak bytes, so the
        // coded stream is packed back up (zero-padding the tail, which the
        // receive side drops as a partial block).
        let data = match &self.hamming {
            Some(hamming) => {
                let coded = hamming.add(bytes);
                debug!(coded_bits = coded.len(), "tx: hamming applied");
                bits_to_bytes_padded(&coded)
            }
            None => bytes.to_vec(),
        };

        let protected = self.detector.add(&data);
        debug!(
            scheme = ?self.detector.scheme(),
            bytes = protected.len(),
            "tx: detection applied"
        );

        let mut wire = self.framer.frame(&protected)?;
        debug!(
            scheme = ?self.framer.scheme(),
            wire_bits = wire.len(),
            "tx: framed"
        );

        // The modem consumes whole symbols; pad the tail with zero bits so
        // no frame bit is truncated. Every deframer tolerates the padding.
        let k = self.modem.bits_per_symbol();
        while wire.len() % k != 0 {
            wire.push(0);
        }

        let signal = self.modem.encode(&wire);
        info!(
            modem = self.modem.describe(),
            samples = signal.len(),
            "tx: signal ready"
        );
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linklab_core::config::LinkConfig;
    use linklab_frame::detect::Detection;
    use linklab_frame::framing::Framing;
    use linklab_modem::carrier::{CarrierModem, CarrierScheme};
    use linklab_modem::line::{LineCode, LineModem};

    fn transmitter(hamming: bool) -> Transmitter {
        let config = LinkConfig::default();
        Transmitter::new(
            LineModem::new(LineCode::NrzPolar, &config).unwrap().into(),
            Framer::new(Framing::CountPrefixed, &config),
            Detector::new(Detection::Checksum),
            hamming.then(Hamming::default),
        )
    }

    #[test]
    fn nrz_signal_length_matches_the_wire_bits() {
        // "AB" = 2 bytes, +1 checksum byte, +1 count byte = 32 wire bits.
        let signal = transmitter(false).transmit("AB").unwrap();
        assert_eq!(signal.len(), 32);
    }

    #[test]
    fn hamming_expands_the_signal() {
        let plain = transmitter(false).transmit("AB").unwrap();
        let coded = transmitter(true).transmit("AB").unwrap();
        assert!(coded.len() > plain.len());
    }

    #[test]
    fn empty_message_still_produces_a_frame() {
        let signal = transmitter(false).transmit("").unwrap();
        // Count byte plus the checksum of an empty payload.
        assert_eq!(signal.len(), 16);
    }

    #[test]
    fn wire_bits_are_padded_to_whole_symbols() {
        let config = LinkConfig::default();
        let tx = Transmitter::new(
            CarrierModem::new(CarrierScheme::Qam16, &config).unwrap().into(),
            Framer::new(Framing::BitStuffing, &config),
            Detector::new(Detection::Parity),
            None,
        );
        let signal = tx.transmit("hello").unwrap();
        let samples_per_symbol = config.samples_per_bit();
        assert_eq!(signal.len() % samples_per_symbol, 0);
    }

    #[test]
    fn oversize_message_is_rejected() {
        let message = "x".repeat(4096);
        assert!(transmitter(false).transmit(&message).is_err());
    }
}
