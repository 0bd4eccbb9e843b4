//! Error detection: even parity, one's-complement checksum, table-driven CRC
//!
//! A detector appends redundancy to a byte stream and, on the receive side,
//! strips it again while reporting whether the redundancy still matches.
//! Verification is diagnosis, not repair: the payload is always returned,
//! corrupted or not, and the caller decides what to do with the flag.

use linklab_core::bits::{bits_to_bytes, bits_to_bytes_padded, bytes_to_bits};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supported CRC register widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrcWidth {
    Crc8,
    Crc16,
    Crc24,
    Crc32,
}

impl CrcWidth {
    /// Width of the CRC register in bits.
    pub fn bits(&self) -> u32 {
        match self {
            CrcWidth::Crc8 => 8,
            CrcWidth::Crc16 => 16,
            CrcWidth::Crc24 => 24,
            CrcWidth::Crc32 => 32,
        }
    }

    /// Bytes appended to the payload.
    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }

    /// All-ones register mask for this width.
    fn mask(&self) -> u32 {
        (u64::from(u32::MAX) >> (32 - self.bits())) as u32
    }

    /// Reflected generator polynomial (right-shift algorithm).
    fn polynomial(&self) -> u32 {
        match self {
            CrcWidth::Crc8 => 0xE0,
            CrcWidth::Crc16 => 0x8408,
            CrcWidth::Crc24 => 0xDF3261,
            CrcWidth::Crc32 => 0xEDB8_8320,
        }
    }
}

/// The closed set of supported detection schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection {
    /// One even-parity bit per payload byte.
    Parity,
    /// One's complement of the byte sum modulo 256, one trailing byte.
    Checksum,
    /// Cyclic redundancy check of the given width, appended big-endian.
    Crc(CrcWidth),
}

/// Error detector for one scheme.
#[derive(Debug, Clone)]
pub struct Detector {
    kind: DetectorKind,
}

#[derive(Debug, Clone)]
enum DetectorKind {
    Parity,
    Checksum,
    Crc(CrcCodec),
}

impl Detector {
    /// Create a detector for the given scheme. CRC variants build their
    /// full 256-entry division table here, once.
    pub fn new(scheme: Detection) -> Self {
        let kind = match scheme {
            Detection::Parity => DetectorKind::Parity,
            Detection::Checksum => DetectorKind::Checksum,
            Detection::Crc(width) => DetectorKind::Crc(CrcCodec::new(width)),
        };
        Self { kind }
    }

    /// The detection scheme in use.
    pub fn scheme(&self) -> Detection {
        match &self.kind {
            DetectorKind::Parity => Detection::Parity,
            DetectorKind::Checksum => Detection::Checksum,
            DetectorKind::Crc(codec) => Detection::Crc(codec.width),
        }
    }

    /// Append the redundancy for `data`.
    pub fn add(&self, data: &[u8]) -> Vec<u8> {
        match &self.kind {
            DetectorKind::Parity => {
                let mut bits = Vec::with_capacity(data.len() * 9);
                for &byte in data {
                    bits.extend(bytes_to_bits(&[byte]));
                    bits.push((byte.count_ones() % 2) as u8);
                }
                bits_to_bytes_padded(&bits)
            }
            DetectorKind::Checksum => {
                let mut out = data.to_vec();
                out.push(checksum(data));
                out
            }
            DetectorKind::Crc(codec) => {
                let crc = codec.compute(data);
                let mut out = data.to_vec();
                out.extend_from_slice(&crc.to_be_bytes()[4 - codec.width.bytes()..]);
                out
            }
        }
    }

    /// Strip the redundancy and report whether a mismatch was seen. The
    /// payload is returned either way.
    pub fn verify(&self, data: &[u8]) -> (Vec<u8>, bool) {
        match &self.kind {
            DetectorKind::Parity => {
                let bits = bytes_to_bits(data);
                let mut payload_bits = Vec::with_capacity(bits.len());
                let mut mismatch = false;
                // Trailing bits short of a full 9-bit group are packing
                // padding and carry no payload.
                for group in bits.chunks_exact(9) {
                    let byte_bits = &group[..8];
                    let parity: u8 = byte_bits.iter().sum::<u8>() % 2;
                    if parity != group[8] {
                        mismatch = true;
                    }
                    payload_bits.extend_from_slice(byte_bits);
                }
                if mismatch {
                    debug!("parity mismatch in received block");
                }
                (bits_to_bytes(&payload_bits), mismatch)
            }
            DetectorKind::Checksum => {
                let Some((&received, payload)) = data.split_last() else {
                    return (Vec::new(), true);
                };
                let mismatch = received != checksum(payload);
                if mismatch {
                    debug!("checksum mismatch in received block");
                }
                (payload.to_vec(), mismatch)
            }
            DetectorKind::Crc(codec) => {
                let width = codec.width;
                if data.len() < width.bytes() {
                    return (Vec::new(), true);
                }
                let (payload, trailer) = data.split_at(data.len() - width.bytes());
                let mut received = 0u32;
                for &byte in trailer {
                    received = (received << 8) | u32::from(byte);
                }
                let mismatch = received != codec.compute(payload);
                if mismatch {
                    debug!("CRC-{} mismatch in received block", width.bits());
                }
                (payload.to_vec(), mismatch)
            }
        }
    }
}

/// Table-driven CRC register of one width.
#[derive(Debug, Clone)]
struct CrcCodec {
    width: CrcWidth,
    table: Box<[u32; 256]>,
}

impl CrcCodec {
    /// Build the 256-entry division table for the reflected polynomial.
    fn new(width: CrcWidth) -> Self {
        let polynomial = width.polynomial();
        let mut table = Box::new([0u32; 256]);
        for (index, entry) in table.iter_mut().enumerate() {
            let mut crc = index as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ polynomial
                } else {
                    crc >> 1
                };
            }
            *entry = crc;
        }
        Self { width, table }
    }

    /// All-ones preset, right-shift division, complemented result.
    fn compute(&self, data: &[u8]) -> u32 {
        let mask = self.width.mask();
        let mut register = mask;
        for &byte in data {
            let index = ((register ^ u32::from(byte)) & 0xFF) as usize;
            register = (register >> 8) ^ self.table[index];
        }
        (register ^ mask) & mask
    }
}

/// One's complement of the byte sum modulo 256.
fn checksum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    255 - sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_known_answer() {
        let detector = Detector::new(Detection::Checksum);
        assert_eq!(detector.add(&[10, 20, 30]), vec![10, 20, 30, 195]);
        assert_eq!(
            detector.verify(&[10, 20, 30, 195]),
            (vec![10, 20, 30], false)
        );
    }

    #[test]
    fn checksum_flags_corruption() {
        let detector = Detector::new(Detection::Checksum);
        let mut block = detector.add(&[10, 20, 30]);
        block[1] ^= 0x04;
        let (payload, mismatch) = detector.verify(&block);
        assert!(mismatch);
        // The damaged payload is still surfaced.
        assert_eq!(payload, vec![10, 16, 30]);
    }

    #[test]
    fn checksum_of_empty_block_is_error() {
        let detector = Detector::new(Detection::Checksum);
        assert_eq!(detector.verify(&[]), (Vec::new(), true));
    }

    #[test]
    fn parity_round_trip() {
        let detector = Detector::new(Detection::Parity);
        let data = [0x48, 0x69];
        let block = detector.add(&data);
        // 2 bytes become 18 bits, packed into 3 bytes.
        assert_eq!(block.len(), 3);
        assert_eq!(detector.verify(&block), (data.to_vec(), false));
    }

    #[test]
    fn parity_detects_single_flip() {
        let detector = Detector::new(Detection::Parity);
        let mut block = detector.add(&[0x48, 0x69]);
        block[0] ^= 0x80;
        let (_, mismatch) = detector.verify(&block);
        assert!(mismatch);
    }

    #[test]
    fn parity_misses_double_flip_in_one_byte() {
        // An even number of flips inside one byte cancels out; this is the
        // scheme's documented blind spot.
        let detector = Detector::new(Detection::Parity);
        let mut block = detector.add(&[0x48, 0x69]);
        block[0] ^= 0xC0;
        let (payload, mismatch) = detector.verify(&block);
        assert!(!mismatch);
        assert_eq!(payload, vec![0x88, 0x69]);
    }

    #[test]
    fn crc32_matches_reference_implementation() {
        let detector = Detector::new(Detection::Crc(CrcWidth::Crc32));
        for data in [&b""[..], b"123456789", b"Hello, LinkLab"] {
            let block = detector.add(data);
            let trailer = &block[data.len()..];
            assert_eq!(trailer, crc32fast::hash(data).to_be_bytes());
        }
    }

    #[test]
    fn crc32_detects_every_single_bit_flip() {
        let detector = Detector::new(Detection::Crc(CrcWidth::Crc32));
        let block = detector.add(&[0xDE, 0xAD, 0xBE, 0xEF, 0x42]);
        for byte_idx in 0..block.len() {
            for bit in 0..8 {
                let mut corrupted = block.clone();
                corrupted[byte_idx] ^= 1 << bit;
                let (_, mismatch) = detector.verify(&corrupted);
                assert!(mismatch, "flip at byte {byte_idx} bit {bit} went undetected");
            }
        }
    }

    #[test]
    fn every_crc_width_round_trips() {
        for width in [CrcWidth::Crc8, CrcWidth::Crc16, CrcWidth::Crc24, CrcWidth::Crc32] {
            let detector = Detector::new(Detection::Crc(width));
            let data = [1, 2, 3, 4, 5];
            let block = detector.add(&data);
            assert_eq!(block.len(), data.len() + width.bytes());
            assert_eq!(detector.verify(&block), (data.to_vec(), false), "{width:?}");
        }
    }

    #[test]
    fn short_crc_block_is_error() {
        let detector = Detector::new(Detection::Crc(CrcWidth::Crc32));
        assert_eq!(detector.verify(&[1, 2]), (Vec::new(), true));
    }
}
