//! Passband carrier modulation: ASK, FSK, QPSK, 16-QAM
//!
//! Every scheme emits the same fixed number of samples per symbol, derived
//! from the configured sample rate and bit rate; the decoder slices the
//! incoming signal into windows of that size and decides each symbol
//! independently by energy or correlation. An input bit count that is not a
//! multiple of the scheme's bits per symbol is truncated to the largest
//! multiple; the trailing bits are dropped. That is a documented limitation
//! of the symbol slicing, not an error.

use crate::{ModemError, Result};
use linklab_core::config::LinkConfig;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The closed set of supported carrier schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarrierScheme {
    /// On-off keying: 1 -> carrier burst, 0 -> silence.
    Ask,
    /// 1 -> carrier at twice the base frequency, 0 -> base frequency.
    Fsk,
    /// One of four phases per 2-bit symbol.
    Qpsk,
    /// Four amplitude levels on each of the I and Q rails per 4-bit symbol.
    Qam16,
}

impl CarrierScheme {
    /// Bits carried by one symbol.
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            CarrierScheme::Ask | CarrierScheme::Fsk => 1,
            CarrierScheme::Qpsk => 2,
            CarrierScheme::Qam16 => 4,
        }
    }
}

/// In-phase/quadrature levels, indexed by the value of a bit pair.
const QAM_LEVELS: [f64; 4] = [-3.0, -1.0, 1.0, 3.0];

/// Passband modulator/demodulator for one carrier scheme.
#[derive(Debug, Clone)]
pub struct CarrierModem {
    scheme: CarrierScheme,
    amplitude: f64,
    carrier_frequency: f64,
    sample_rate: f64,
    samples_per_symbol: usize,
}

impl CarrierModem {
    /// Create a carrier modem from the shared configuration.
    pub fn new(scheme: CarrierScheme, config: &LinkConfig) -> Result<Self> {
        config.validate()?;
        if config.carrier_frequency <= 0.0 {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid carrier frequency: {}", config.carrier_frequency),
            });
        }
        let samples_per_symbol = config.samples_per_bit();
        if samples_per_symbol == 0 {
            return Err(ModemError::InvalidParameters {
                msg: format!(
                    "Bit rate {} leaves no samples per symbol at {} Hz",
                    config.bit_rate, config.sample_rate
                ),
            });
        }
        Ok(Self {
            scheme,
            amplitude: config.amplitude,
            carrier_frequency: config.carrier_frequency,
            sample_rate: config.sample_rate,
            samples_per_symbol,
        })
    }

    /// The carrier scheme this modem speaks.
    pub fn scheme(&self) -> CarrierScheme {
        self.scheme
    }

    /// Samples emitted per symbol.
    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    /// Bits carried by one symbol.
    pub fn bits_per_symbol(&self) -> usize {
        self.scheme.bits_per_symbol()
    }

    /// Encode bits into a sample sequence, one symbol window at a time.
    pub fn encode(&self, bits: &[u8]) -> Vec<f64> {
        let k = self.scheme.bits_per_symbol();
        let n = self.samples_per_symbol;
        let mut signal = Vec::with_capacity((bits.len() / k) * n);

        for symbol in bits.chunks_exact(k) {
            match self.scheme {
                CarrierScheme::Ask => {
                    if symbol[0] == 1 {
                        self.push_tone(&mut signal, self.carrier_frequency, 0.0);
                    } else {
                        signal.extend(std::iter::repeat(0.0).take(n));
                    }
                }
                CarrierScheme::Fsk => {
                    let freq = if symbol[0] == 1 {
                        self.carrier_frequency * 2.0
                    } else {
                        self.carrier_frequency
                    };
                    self.push_tone(&mut signal, freq, 0.0);
                }
                CarrierScheme::Qpsk => {
                    self.push_tone(
                        &mut signal,
                        self.carrier_frequency,
                        qpsk_phase(symbol[0], symbol[1]),
                    );
                }
                CarrierScheme::Qam16 => {
                    let scale = self.amplitude / 3.0;
                    let level_i = QAM_LEVELS[pair_index(symbol[0], symbol[1])] * scale;
                    let level_q = QAM_LEVELS[pair_index(symbol[2], symbol[3])] * scale;
                    let omega = 2.0 * PI * self.carrier_frequency;
                    for sample_idx in 0..n {
                        let t = sample_idx as f64 / self.sample_rate;
                        signal.push(level_i * (omega * t).cos() - level_q * (omega * t).sin());
                    }
                }
            }
        }

        signal
    }

    /// Decode a sample sequence back into bits. A trailing window shorter
    /// than one symbol is dropped.
    pub fn decode(&self, signal: &[f64]) -> Vec<u8> {
        let n = self.samples_per_symbol;
        let mut bits = Vec::with_capacity((signal.len() / n) * self.scheme.bits_per_symbol());

        for window in signal.chunks_exact(n) {
            match self.scheme {
                CarrierScheme::Ask => {
                    let energy: f64 = window.iter().map(|s| s * s).sum();
                    // 25% of the expected full-symbol energy A^2 * n / 2.
                    let threshold = self.amplitude * self.amplitude * n as f64 * 0.5 * 0.25;
                    bits.push(u8::from(energy > threshold));
                }
                CarrierScheme::Fsk => {
                    let low = self.correlate(window, self.carrier_frequency).abs();
                    let high = self.correlate(window, self.carrier_frequency * 2.0).abs();
                    bits.push(u8::from(high > low));
                }
                CarrierScheme::Qpsk => {
                    let (i_sum, q_sum) = self.iq_correlate(window);
                    let phase = q_sum.atan2(i_sum);
                    let pair = if phase > -PI / 2.0 && phase <= 0.0 {
                        [0, 1]
                    } else if phase > 0.0 && phase <= PI / 2.0 {
                        [1, 1]
                    } else if phase > PI / 2.0 && phase <= PI {
                        [1, 0]
                    } else {
                        [0, 0]
                    };
                    bits.extend_from_slice(&pair);
                }
                CarrierScheme::Qam16 => {
                    let (i_sum, q_sum) = self.iq_correlate(window);
                    let (energy_i, energy_q) = self.reference_energy(window.len());
                    let level_i = i_sum / energy_i;
                    let level_q = q_sum / energy_q;
                    bits.extend_from_slice(&self.quantize_level(level_i));
                    bits.extend_from_slice(&self.quantize_level(level_q));
                }
            }
        }

        bits
    }

    /// Append one symbol window of A*cos(2*pi*freq*t + phase).
    fn push_tone(&self, signal: &mut Vec<f64>, freq: f64, phase: f64) {
        let omega = 2.0 * PI * freq;
        for sample_idx in 0..self.samples_per_symbol {
            let t = sample_idx as f64 / self.sample_rate;
            signal.push(self.amplitude * (omega * t + phase).cos());
        }
    }

    /// Correlation of the window against a unit cosine at `freq`.
    fn correlate(&self, window: &[f64], freq: f64) -> f64 {
        let omega = 2.0 * PI * freq;
        window
            .iter()
            .enumerate()
            .map(|(sample_idx, &s)| {
                let t = sample_idx as f64 / self.sample_rate;
                s * (omega * t).cos()
            })
            .sum()
    }

    /// In-phase and quadrature correlations against the carrier.
    fn iq_correlate(&self, window: &[f64]) -> (f64, f64) {
        let omega = 2.0 * PI * self.carrier_frequency;
        let mut i_sum = 0.0;
        let mut q_sum = 0.0;
        for (sample_idx, &s) in window.iter().enumerate() {
            let t = sample_idx as f64 / self.sample_rate;
            i_sum += s * (omega * t).cos();
            q_sum += s * -(omega * t).sin();
        }
        (i_sum, q_sum)
    }

    /// Energies of the I and Q reference carriers over one window, used to
    /// normalize the correlations back to amplitude levels.
    fn reference_energy(&self, window_len: usize) -> (f64, f64) {
        let omega = 2.0 * PI * self.carrier_frequency;
        let mut energy_i = 0.0;
        let mut energy_q = 0.0;
        for sample_idx in 0..window_len {
            let t = sample_idx as f64 / self.sample_rate;
            let c = (omega * t).cos();
            let s = (omega * t).sin();
            energy_i += c * c;
            energy_q += s * s;
        }
        (energy_i, energy_q)
    }

    /// Quantize a recovered rail level to the nearest constellation level
    /// (thresholds at -2, 0, +2 of the scaled grid) and map it back to its
    /// bit-pair index.
    fn quantize_level(&self, level: f64) -> [u8; 2] {
        let step = self.amplitude / 3.0;
        let index = if level > 2.0 * step {
            3
        } else if level > 0.0 {
            2
        } else if level > -2.0 * step {
            1
        } else {
            0
        };
        [(index >> 1) as u8, (index & 1) as u8]
    }
}

/// QPSK phase table; one fixed phase per bit pair.
fn qpsk_phase(first: u8, second: u8) -> f64 {
    match (first, second) {
        (1, 1) => PI / 4.0,
        (1, 0) => 3.0 * PI / 4.0,
        (0, 0) => 5.0 * PI / 4.0,
        _ => 7.0 * PI / 4.0,
    }
}

/// Value of a bit pair as an index into `QAM_LEVELS`.
fn pair_index(first: u8, second: u8) -> usize {
    ((first & 1) as usize) << 1 | (second & 1) as usize
}
