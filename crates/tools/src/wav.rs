//! WAV file I/O for modulated signals
//!
//! Signals are stored as mono 32-bit float WAV so the raw sample values
//! survive the round trip; the simulator's amplitudes are not confined to
//! the usual audio range and must not be rescaled or clipped.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Write a signal to a mono float WAV file.
pub fn write_signal(path: &Path, signal: &[f64], sample_rate: f64) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    for &sample in signal {
        writer.write_sample(sample as f32)?;
    }

    writer.finalize()?;
    info!("Wrote {} samples to {:?}", signal.len(), path);
    Ok(())
}

/// Read a signal from a mono float WAV file.
pub fn read_signal(path: &Path) -> Result<Vec<f64>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Float || spec.bits_per_sample != 32 {
        anyhow::bail!(
            "Unsupported WAV format in {:?}: expected 32-bit float mono",
            path
        );
    }

    let samples: std::result::Result<Vec<f32>, _> = reader.samples::<f32>().collect();
    let samples = samples.with_context(|| "Failed to read audio samples")?;

    info!("Read {} samples from {:?}", samples.len(), path);
    Ok(samples.into_iter().map(f64::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn signal_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("signal.wav");

        let signal = vec![5.0, -5.0, 0.0, 2.5, -0.125];
        write_signal(&path, &signal, 1000.0).unwrap();
        let loaded = read_signal(&path).unwrap();

        assert_eq!(loaded, signal);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_signal(&dir.path().join("absent.wav")).is_err());
    }
}
