//! Stack selection shared by the tx, rx and simulate subcommands
//!
//! Both ends of a link must be built from the same choices, so the CLI
//! collects them once and each subcommand assembles its own pipeline from
//! the same `StackArgs` value.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use linklab_core::config::LinkConfig;
use linklab_frame::detect::{CrcWidth, Detection, Detector};
use linklab_frame::framing::{Framer, Framing};
use linklab_frame::hamming::Hamming;
use linklab_modem::carrier::{CarrierModem, CarrierScheme};
use linklab_modem::line::{LineCode, LineModem};
use linklab_pipeline::phy::PhyModem;
use linklab_pipeline::receiver::Receiver;
use linklab_pipeline::transmitter::Transmitter;
use std::path::PathBuf;

/// Physical-layer codec selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModulationArg {
    /// NRZ-Polar line code
    Nrz,
    /// Manchester line code
    Manchester,
    /// Bipolar-AMI line code
    Ami,
    /// Amplitude shift keying
    Ask,
    /// Frequency shift keying
    Fsk,
    /// Quadrature phase shift keying
    Qpsk,
    /// 16-point quadrature amplitude modulation
    Qam16,
}

/// Framing scheme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FramingArg {
    /// Length byte before the payload
    Count,
    /// FLAG-delimited frame with byte stuffing
    ByteStuff,
    /// 01111110-delimited frame with bit stuffing
    BitStuff,
}

/// Error detection selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetectionArg {
    /// One even-parity bit per byte
    Parity,
    /// One's-complement byte checksum
    Checksum,
    Crc8,
    Crc16,
    Crc24,
    Crc32,
}

impl DetectionArg {
    fn detection(self) -> Detection {
        match self {
            DetectionArg::Parity => Detection::Parity,
            DetectionArg::Checksum => Detection::Checksum,
            DetectionArg::Crc8 => Detection::Crc(CrcWidth::Crc8),
            DetectionArg::Crc16 => Detection::Crc(CrcWidth::Crc16),
            DetectionArg::Crc24 => Detection::Crc(CrcWidth::Crc24),
            DetectionArg::Crc32 => Detection::Crc(CrcWidth::Crc32),
        }
    }
}

/// Pipeline stage choices common to every subcommand.
#[derive(Debug, Clone, Parser)]
pub struct StackArgs {
    /// Modulation scheme
    #[arg(short, long, value_enum, default_value = "nrz")]
    pub modulation: ModulationArg,

    /// Framing scheme
    #[arg(long, value_enum, default_value = "byte-stuff")]
    pub framing: FramingArg,

    /// Error detection scheme
    #[arg(short, long, value_enum, default_value = "crc32")]
    pub detection: DetectionArg,

    /// Enable Hamming(7,4) error correction
    #[arg(long)]
    pub hamming: bool,

    /// Pipeline configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl StackArgs {
    /// Resolve the pipeline configuration, loading the TOML file when one
    /// was given.
    pub fn link_config(&self) -> Result<LinkConfig> {
        match &self.config {
            Some(path) => crate::config::load_link_config(path),
            None => Ok(LinkConfig::default()),
        }
    }

    /// Build the physical codec for the selected modulation.
    pub fn phy_modem(&self, config: &LinkConfig) -> Result<PhyModem> {
        let modem = match self.modulation {
            ModulationArg::Nrz => LineModem::new(LineCode::NrzPolar, config)?.into(),
            ModulationArg::Manchester => LineModem::new(LineCode::Manchester, config)?.into(),
            ModulationArg::Ami => LineModem::new(LineCode::BipolarAmi, config)?.into(),
            ModulationArg::Ask => CarrierModem::new(CarrierScheme::Ask, config)?.into(),
            ModulationArg::Fsk => CarrierModem::new(CarrierScheme::Fsk, config)?.into(),
            ModulationArg::Qpsk => CarrierModem::new(CarrierScheme::Qpsk, config)?.into(),
            ModulationArg::Qam16 => CarrierModem::new(CarrierScheme::Qam16, config)?.into(),
        };
        Ok(modem)
    }

    fn framing(&self) -> Framing {
        match self.framing {
            FramingArg::Count => Framing::CountPrefixed,
            FramingArg::ByteStuff => Framing::ByteStuffing,
            FramingArg::BitStuff => Framing::BitStuffing,
        }
    }

    fn hamming(&self) -> Option<Hamming> {
        self.hamming.then(Hamming::default)
    }

    /// Assemble the transmit pipeline.
    pub fn transmitter(&self, config: &LinkConfig) -> Result<Transmitter> {
        Ok(Transmitter::new(
            self.phy_modem(config)?,
            Framer::new(self.framing(), config),
            Detector::new(self.detection.detection()),
            self.hamming(),
        ))
    }

    /// Assemble the receive pipeline.
    pub fn receiver(&self, config: &LinkConfig) -> Result<Receiver> {
        Ok(Receiver::new(
            self.phy_modem(config)?,
            Framer::new(self.framing(), config),
            Detector::new(self.detection.detection()),
            self.hamming(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(modulation: ModulationArg) -> StackArgs {
        StackArgs {
            modulation,
            framing: FramingArg::ByteStuff,
            detection: DetectionArg::Crc32,
            hamming: true,
            config: None,
        }
    }

    #[test]
    fn every_modulation_choice_builds() {
        let config = LinkConfig::default();
        for modulation in [
            ModulationArg::Nrz,
            ModulationArg::Manchester,
            ModulationArg::Ami,
            ModulationArg::Ask,
            ModulationArg::Fsk,
            ModulationArg::Qpsk,
            ModulationArg::Qam16,
        ] {
            assert!(args(modulation).phy_modem(&config).is_ok(), "{modulation:?}");
        }
    }

    #[test]
    fn built_pipelines_match_end_to_end() {
        let stack = args(ModulationArg::Qpsk);
        let config = stack.link_config().unwrap();
        let tx = stack.transmitter(&config).unwrap();
        let rx = stack.receiver(&config).unwrap();

        let signal = tx.transmit("stack check").unwrap();
        let reception = rx.receive(&signal);
        assert_eq!(reception.text, "stack check");
        assert!(!reception.error_detected);
    }

    #[test]
    fn bad_config_surfaces_at_build_time() {
        let mut config = LinkConfig::default();
        config.amplitude = -1.0;
        assert!(args(ModulationArg::Nrz).phy_modem(&config).is_err());
    }
}
