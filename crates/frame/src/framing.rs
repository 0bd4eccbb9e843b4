//! Frame delimiting: count prefix, byte stuffing, bit stuffing
//!
//! A framer turns a byte payload into the bit stream that goes on the wire
//! and recovers the payload on the far side. Deframing never fails: a
//! malformed frame yields an empty (or truncated) payload and the upper
//! layers surface the damage through their own checks. All three deframers
//! tolerate trailing padding after the frame, so the transmitter is free to
//! pad the wire bits up to a whole modulation symbol.

use crate::{FrameError, Result};
use linklab_core::bits::{bits_to_bytes, bytes_to_bits};
use linklab_core::config::LinkConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HDLC-style delimiter, 0x7E as bits.
pub const FLAG_PATTERN: [u8; 8] = [0, 1, 1, 1, 1, 1, 1, 0];

/// The closed set of supported framing schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framing {
    /// One count byte holding the payload length in bytes, then the payload.
    CountPrefixed,
    /// FLAG-delimited frame with ESC inserted before literal FLAG/ESC bytes.
    ByteStuffing,
    /// 01111110-delimited frame with a 0 inserted after five consecutive 1s.
    BitStuffing,
}

/// Framer/deframer for one framing scheme.
#[derive(Debug, Clone)]
pub struct Framer {
    scheme: Framing,
    flag_byte: u8,
    escape_byte: u8,
    max_frame_bytes: usize,
}

impl Framer {
    /// Create a framer from the shared configuration.
    pub fn new(scheme: Framing, config: &LinkConfig) -> Self {
        Self {
            scheme,
            flag_byte: config.flag_byte,
            escape_byte: config.escape_byte,
            max_frame_bytes: config.max_frame_bytes,
        }
    }

    /// The framing scheme in use.
    pub fn scheme(&self) -> Framing {
        self.scheme
    }

    /// Wrap a byte payload into the wire bit stream.
    pub fn frame(&self, payload: &[u8]) -> Result<Vec<u8>> {
        // The count field is a single byte, so count framing caps out at 255
        // even when the configured maximum is larger.
        let max = match self.scheme {
            Framing::CountPrefixed => self.max_frame_bytes.min(u8::MAX as usize),
            _ => self.max_frame_bytes,
        };
        if payload.len() > max {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max,
            });
        }

        match self.scheme {
            Framing::CountPrefixed => {
                let mut frame = Vec::with_capacity(payload.len() + 1);
                frame.push(payload.len() as u8);
                frame.extend_from_slice(payload);
                Ok(bytes_to_bits(&frame))
            }
            Framing::ByteStuffing => {
                let mut frame = Vec::with_capacity(payload.len() + 2);
                frame.push(self.flag_byte);
                for &byte in payload {
                    if byte == self.flag_byte || byte == self.escape_byte {
                        frame.push(self.escape_byte);
                    }
                    frame.push(byte);
                }
                frame.push(self.flag_byte);
                Ok(bytes_to_bits(&frame))
            }
            Framing::BitStuffing => {
                let mut wire = Vec::with_capacity(payload.len() * 8 + 16);
                wire.extend_from_slice(&FLAG_PATTERN);
                let mut run = 0u32;
                for bit in bytes_to_bits(payload) {
                    wire.push(bit);
                    if bit == 1 {
                        run += 1;
                        if run == 5 {
                            wire.push(0);
                            run = 0;
                        }
                    } else {
                        run = 0;
                    }
                }
                wire.extend_from_slice(&FLAG_PATTERN);
                Ok(wire)
            }
        }
    }

    /// Recover the byte payload from a wire bit stream.
    pub fn deframe(&self, bits: &[u8]) -> Vec<u8> {
        match self.scheme {
            Framing::CountPrefixed => {
                let bytes = bits_to_bytes(bits);
                let Some((&count, rest)) = bytes.split_first() else {
                    debug!("count-prefixed frame shorter than its count field");
                    return Vec::new();
                };
                // A corrupted count field desynchronizes the stream; the
                // available prefix is the best we can do.
                rest[..rest.len().min(count as usize)].to_vec()
            }
            Framing::ByteStuffing => self.deframe_byte_stuffed(&bits_to_bytes(bits)),
            Framing::BitStuffing => self.deframe_bit_stuffed(bits),
        }
    }

    fn deframe_byte_stuffed(&self, bytes: &[u8]) -> Vec<u8> {
        let Some(open) = bytes.iter().position(|&b| b == self.flag_byte) else {
            debug!("no opening flag in byte-stuffed frame");
            return Vec::new();
        };
        let Some(close) = bytes.iter().rposition(|&b| b == self.flag_byte) else {
            return Vec::new();
        };
        if close <= open {
            debug!("no closing flag in byte-stuffed frame");
            return Vec::new();
        }

        let mut payload = Vec::with_capacity(close - open);
        let mut escaped = false;
        for &byte in &bytes[open + 1..close] {
            if escaped {
                payload.push(byte);
                escaped = false;
            } else if byte == self.escape_byte {
                escaped = true;
            } else {
                payload.push(byte);
            }
        }
        payload
    }

    fn deframe_bit_stuffed(&self, bits: &[u8]) -> Vec<u8> {
        let Some(open) = find_flag(bits, 0) else {
            debug!("no opening flag in bit-stuffed frame");
            return Vec::new();
        };
        let Some(close) = rfind_flag(bits, open + FLAG_PATTERN.len()) else {
            debug!("no closing flag in bit-stuffed frame");
            return Vec::new();
        };

        let stuffed = &bits[open + FLAG_PATTERN.len()..close];
        let mut payload_bits = Vec::with_capacity(stuffed.len());
        let mut run = 0u32;
        let mut skip_next = false;
        for &bit in stuffed {
            if skip_next {
                // The bit after five 1s is the stuffed 0.
                skip_next = false;
                run = 0;
                continue;
            }
            payload_bits.push(bit);
            if bit == 1 {
                run += 1;
                if run == 5 {
                    skip_next = true;
                }
            } else {
                run = 0;
            }
        }
        bits_to_bytes(&payload_bits)
    }
}

/// First position at or after `from` where the flag pattern starts.
fn find_flag(bits: &[u8], from: usize) -> Option<usize> {
    bits.get(from..)?
        .windows(FLAG_PATTERN.len())
        .position(|window| window == FLAG_PATTERN)
        .map(|offset| from + offset)
}

/// Last position at or after `from` where the flag pattern starts.
fn rfind_flag(bits: &[u8], from: usize) -> Option<usize> {
    bits.get(from..)?
        .windows(FLAG_PATTERN.len())
        .rposition(|window| window == FLAG_PATTERN)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn framer(scheme: Framing) -> Framer {
        Framer::new(scheme, &LinkConfig::default())
    }

    #[test]
    fn count_prefix_matches_wire_layout() {
        let framer = framer(Framing::CountPrefixed);
        let wire = framer.frame(&[65, 66, 67]).unwrap();
        assert_eq!(wire, bytes_to_bits(&[3, 65, 66, 67]));
        assert_eq!(framer.deframe(&wire), vec![65, 66, 67]);
    }

    #[test]
    fn count_prefix_truncated_remainder_yields_prefix() {
        let framer = framer(Framing::CountPrefixed);
        // Count claims 9 bytes but only two follow.
        assert_eq!(framer.deframe(&bytes_to_bits(&[9, 65, 66])), vec![65, 66]);
        assert_eq!(framer.deframe(&[]), Vec::<u8>::new());
    }

    #[test]
    fn byte_stuffing_escapes_flag_and_escape() {
        let framer = framer(Framing::ByteStuffing);
        let payload = [0x41, 0x7E, 0x7D, 0x42];
        let wire = framer.frame(&payload).unwrap();
        assert_eq!(
            bits_to_bytes(&wire),
            vec![0x7E, 0x41, 0x7D, 0x7E, 0x7D, 0x7D, 0x42, 0x7E]
        );
        assert_eq!(framer.deframe(&wire), payload);
    }

    #[test]
    fn byte_stuffing_without_flags_is_empty() {
        let framer = framer(Framing::ByteStuffing);
        assert_eq!(framer.deframe(&bytes_to_bits(&[1, 2, 3])), Vec::<u8>::new());
    }

    #[test]
    fn bit_stuffing_breaks_runs_of_ones() {
        let framer = framer(Framing::BitStuffing);
        let wire = framer.frame(&[0xFF]).unwrap();
        let mut expected = FLAG_PATTERN.to_vec();
        // 11111111 -> 111110111
        expected.extend_from_slice(&[1, 1, 1, 1, 1, 0, 1, 1, 1]);
        expected.extend_from_slice(&FLAG_PATTERN);
        assert_eq!(wire, expected);
        assert_eq!(framer.deframe(&wire), vec![0xFF]);
    }

    #[test]
    fn bit_stuffing_payload_may_contain_flag_byte() {
        let framer = framer(Framing::BitStuffing);
        let payload = [0x7E, 0xFF, 0x7E];
        let wire = framer.frame(&payload).unwrap();
        assert_eq!(framer.deframe(&wire), payload);
    }

    #[test]
    fn deframers_tolerate_trailing_padding() {
        for scheme in [Framing::CountPrefixed, Framing::ByteStuffing, Framing::BitStuffing] {
            let framer = framer(scheme);
            let payload = [10, 20, 30];
            let mut wire = framer.frame(&payload).unwrap();
            wire.extend_from_slice(&[0, 0, 0]);
            assert_eq!(framer.deframe(&wire), payload, "{scheme:?}");
        }
    }

    #[test]
    fn oversize_payload_is_rejected() {
        let counted = framer(Framing::CountPrefixed);
        assert!(counted.frame(&[0u8; 300]).is_err());

        let stuffed = framer(Framing::ByteStuffing);
        assert!(stuffed.frame(&[0u8; 300]).is_err());
    }

    #[quickcheck]
    fn prop_byte_stuffing_round_trip(payload: Vec<u8>) -> bool {
        let framer = framer(Framing::ByteStuffing);
        match framer.frame(&payload) {
            Ok(wire) => framer.deframe(&wire) == payload,
            Err(_) => payload.len() > 256,
        }
    }

    #[quickcheck]
    fn prop_bit_stuffing_round_trip(payload: Vec<u8>) -> bool {
        let framer = framer(Framing::BitStuffing);
        match framer.frame(&payload) {
            Ok(wire) => framer.deframe(&wire) == payload,
            Err(_) => payload.len() > 256,
        }
    }

    #[quickcheck]
    fn prop_count_prefix_round_trip(payload: Vec<u8>) -> bool {
        let framer = framer(Framing::CountPrefixed);
        match framer.frame(&payload) {
            Ok(wire) => framer.deframe(&wire) == payload,
            Err(_) => payload.len() > 255,
        }
    }
}
