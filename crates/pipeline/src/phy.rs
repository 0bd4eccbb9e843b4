//! Physical-layer seam used by the orchestrators
//!
//! A pipeline is built over exactly one physical codec, either a baseband
//! line code or a passband carrier scheme. The two-variant enum keeps the
//! choice closed and lets the orchestrators stay agnostic of which family
//! is in use.

use linklab_modem::carrier::CarrierModem;
use linklab_modem::line::LineModem;

/// The physical codec a pipeline modulates with.
#[derive(Debug, Clone)]
pub enum PhyModem {
    Line(LineModem),
    Carrier(CarrierModem),
}

impl PhyModem {
    /// Bits consumed per modulation symbol. Line codes are bit-at-a-time;
    /// carrier schemes may pack several bits per symbol.
    pub fn bits_per_symbol(&self) -> usize {
        match self {
            PhyModem::Line(_) => 1,
            PhyModem::Carrier(modem) => modem.bits_per_symbol(),
        }
    }

    /// Modulate a bit stream into a sample sequence.
    pub fn encode(&self, bits: &[u8]) -> Vec<f64> {
        match self {
            PhyModem::Line(modem) => modem.encode(bits),
            PhyModem::Carrier(modem) => modem.encode(bits),
        }
    }

    /// Demodulate a sample sequence back into bits.
    pub fn decode(&self, signal: &[f64]) -> Vec<u8> {
        match self {
            PhyModem::Line(modem) => modem.decode(signal),
            PhyModem::Carrier(modem) => modem.decode(signal),
        }
    }

    /// Human-readable name of the selected codec, for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            PhyModem::Line(modem) => match modem.code() {
                linklab_modem::line::LineCode::NrzPolar => "NRZ-Polar",
                linklab_modem::line::LineCode::Manchester => "Manchester",
                linklab_modem::line::LineCode::BipolarAmi => "Bipolar-AMI",
            },
            PhyModem::Carrier(modem) => match modem.scheme() {
                linklab_modem::carrier::CarrierScheme::Ask => "ASK",
                linklab_modem::carrier::CarrierScheme::Fsk => "FSK",
                linklab_modem::carrier::CarrierScheme::Qpsk => "QPSK",
                linklab_modem::carrier::CarrierScheme::Qam16 => "16-QAM",
            },
        }
    }
}

impl From<LineModem> for PhyModem {
    fn from(modem: LineModem) -> Self {
        PhyModem::Line(modem)
    }
}

impl From<CarrierModem> for PhyModem {
    fn from(modem: CarrierModem) -> Self {
        PhyModem::Carrier(modem)
    }
}
