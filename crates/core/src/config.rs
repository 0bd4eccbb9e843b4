//! Shared pipeline configuration
//!
//! One `LinkConfig` value is built per pipeline and passed by reference to
//! the codec constructors. There is no process-wide configuration state.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Parameters shared by the physical and data-link layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Carrier/line amplitude in volts.
    pub amplitude: f64,
    /// Carrier frequency in Hz.
    pub carrier_frequency: f64,
    /// Samples per second.
    pub sample_rate: f64,
    /// Bits per second; sample_rate / bit_rate samples span one bit slot.
    pub bit_rate: f64,
    /// Delimiter byte for byte-stuffed framing.
    pub flag_byte: u8,
    /// Escape byte for byte-stuffed framing.
    pub escape_byte: u8,
    /// Maximum payload size accepted by the framers, in bytes.
    pub max_frame_bytes: usize,
    /// Mean of the channel noise distribution.
    pub noise_mean: f64,
    /// Standard deviation of the channel noise distribution.
    pub noise_sigma: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            amplitude: 5.0,
            carrier_frequency: 100.0,
            sample_rate: 1000.0,
            bit_rate: 10.0,
            flag_byte: 0x7E,
            escape_byte: 0x7D,
            max_frame_bytes: 256,
            noise_mean: 0.0,
            noise_sigma: 0.5,
        }
    }
}

impl LinkConfig {
    /// Validate the physical-layer parameters.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if self.bit_rate <= 0.0 || self.bit_rate > self.sample_rate {
            return Err(CoreError::InvalidBitRate {
                rate: self.bit_rate,
            });
        }
        if self.amplitude <= 0.0 {
            return Err(CoreError::InvalidAmplitude {
                value: self.amplitude,
            });
        }
        if self.noise_sigma < 0.0 {
            return Err(CoreError::InvalidNoiseLevel {
                sigma: self.noise_sigma,
            });
        }
        Ok(())
    }

    /// Samples spanning one bit (or one carrier symbol) slot.
    pub fn samples_per_bit(&self) -> usize {
        (self.sample_rate / self.bit_rate) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.samples_per_bit(), 100);
        assert_eq!(config.flag_byte, 0x7E);
        assert_eq!(config.escape_byte, 0x7D);
    }

    #[test]
    fn bad_rates_are_rejected() {
        let mut config = LinkConfig::default();
        config.sample_rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = LinkConfig::default();
        config.bit_rate = 2.0 * config.sample_rate;
        assert!(config.validate().is_err());
    }
}
