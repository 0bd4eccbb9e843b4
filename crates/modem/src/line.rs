//! Baseband line codes: NRZ-Polar, Manchester, Bipolar-AMI
//!
//! A line code maps bits directly to voltage levels with no carrier. Encode
//! and decode are total functions; decoding a signal produced by the same
//! variant with no corruption recovers the original bits exactly.

use crate::{ModemError, Result};
use linklab_core::config::LinkConfig;
use serde::{Deserialize, Serialize};

/// The closed set of supported line codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCode {
    /// 1 -> +A, 0 -> -A, one sample per bit.
    NrzPolar,
    /// 1 -> (-A, +A), 0 -> (+A, -A), two samples per bit.
    Manchester,
    /// 0 -> 0V; 1 alternates +A/-A starting at +A.
    BipolarAmi,
}

/// Baseband modulator/demodulator for one line code.
#[derive(Debug, Clone)]
pub struct LineModem {
    code: LineCode,
    amplitude: f64,
}

impl LineModem {
    /// Create a line modem from the shared configuration.
    pub fn new(code: LineCode, config: &LinkConfig) -> Result<Self> {
        if config.amplitude <= 0.0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid amplitude: {}", config.amplitude),
            });
        }
        Ok(Self {
            code,
            amplitude: config.amplitude,
        })
    }

    /// The line code this modem speaks.
    pub fn code(&self) -> LineCode {
        self.code
    }

    /// Samples emitted per input bit.
    pub fn samples_per_bit(&self) -> usize {
        match self.code {
            LineCode::Manchester => 2,
            LineCode::NrzPolar | LineCode::BipolarAmi => 1,
        }
    }

    /// Encode bits into a sample sequence.
    pub fn encode(&self, bits: &[u8]) -> Vec<f64> {
        let a = self.amplitude;
        match self.code {
            LineCode::NrzPolar => bits
                .iter()
                .map(|&bit| if bit == 1 { a } else { -a })
                .collect(),
            LineCode::Manchester => {
                let mut signal = Vec::with_capacity(bits.len() * 2);
                for &bit in bits {
                    if bit == 1 {
                        signal.extend_from_slice(&[-a, a]);
                    } else {
                        signal.extend_from_slice(&[a, -a]);
                    }
                }
                signal
            }
            LineCode::BipolarAmi => {
                // Mark polarity toggles after every emitted 1, zeros do not
                // affect it.
                let mut polarity = a;
                let mut signal = Vec::with_capacity(bits.len());
                for &bit in bits {
                    if bit == 1 {
                        signal.push(polarity);
                        polarity = -polarity;
                    } else {
                        signal.push(0.0);
                    }
                }
                signal
            }
        }
    }

    /// Decode a sample sequence back into bits.
    pub fn decode(&self, signal: &[f64]) -> Vec<u8> {
        match self.code {
            LineCode::NrzPolar => signal
                .iter()
                .map(|&sample| u8::from(sample > 0.0))
                .collect(),
            // A pair with no sign transition is corrupted input; it decodes
            // to 0, the same branch as the positive-to-negative pair.
            LineCode::Manchester => signal
                .chunks_exact(2)
                .map(|pair| u8::from(pair[0] < 0.0 && pair[1] > 0.0))
                .collect(),
            LineCode::BipolarAmi => signal
                .iter()
                .map(|&sample| u8::from(sample != 0.0))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn modem(code: LineCode) -> LineModem {
        LineModem::new(code, &LinkConfig::default()).unwrap()
    }

    fn to_bits(input: &[bool]) -> Vec<u8> {
        input.iter().map(|&b| u8::from(b)).collect()
    }

    #[test]
    fn nrz_polar_levels() {
        let modem = modem(LineCode::NrzPolar);
        let signal = modem.encode(&[1, 0, 1, 1, 0]);
        assert_eq!(signal, vec![5.0, -5.0, 5.0, 5.0, -5.0]);
        assert_eq!(modem.decode(&signal), vec![1, 0, 1, 1, 0]);
    }

    #[test]
    fn manchester_doubles_the_length() {
        let modem = modem(LineCode::Manchester);
        let bits = [1, 0, 1, 1, 0, 0, 1, 0];
        let signal = modem.encode(&bits);
        assert_eq!(signal.len(), 2 * bits.len());
        assert_eq!(modem.decode(&signal), bits);
    }

    #[test]
    fn manchester_missing_transition_decodes_to_zero() {
        let modem = modem(LineCode::Manchester);
        // Corrupted pairs with no sign transition fall back to 0.
        assert_eq!(modem.decode(&[5.0, 5.0]), vec![0]);
        assert_eq!(modem.decode(&[-5.0, -5.0]), vec![0]);
    }

    #[test]
    fn bipolar_ami_alternates_marks() {
        let modem = modem(LineCode::BipolarAmi);
        let signal = modem.encode(&[1, 0, 1, 1, 0, 1]);
        assert_eq!(signal, vec![5.0, 0.0, -5.0, 5.0, 0.0, -5.0]);
        assert_eq!(modem.decode(&signal), vec![1, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn zero_amplitude_is_rejected() {
        let mut config = LinkConfig::default();
        config.amplitude = 0.0;
        assert!(LineModem::new(LineCode::NrzPolar, &config).is_err());
    }

    #[quickcheck]
    fn prop_nrz_round_trip(input: Vec<bool>) -> bool {
        let modem = modem(LineCode::NrzPolar);
        let bits = to_bits(&input);
        modem.decode(&modem.encode(&bits)) == bits
    }

    #[quickcheck]
    fn prop_manchester_round_trip(input: Vec<bool>) -> bool {
        let modem = modem(LineCode::Manchester);
        let bits = to_bits(&input);
        modem.decode(&modem.encode(&bits)) == bits
    }

    #[quickcheck]
    fn prop_bipolar_round_trip(input: Vec<bool>) -> bool {
        let modem = modem(LineCode::BipolarAmi);
        let bits = to_bits(&input);
        modem.decode(&modem.encode(&bits)) == bits
    }
}
