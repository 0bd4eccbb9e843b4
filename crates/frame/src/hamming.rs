//! Hamming single-error-correcting block code
//!
//! Pure per-block transform applied over fixed-size chunks of the bit
//! stream. The default Hamming(7,4) geometry carries 4 data bits in 7 coded
//! bits; other data widths recompute the parity count from 2^r >= m + r + 1.
//! Parity bits sit at the power-of-two positions of the 1-indexed block,
//! data bits fill the remaining positions in order.
//!
//! Decoding recomputes each parity and sums the positions that disagree.
//! That sum, the syndrome, is 0 when no single-bit error is present and
//! otherwise names the flipped 1-based position, which is repaired in
//! place. A block with two or more flipped bits is silently miscorrected;
//! that is the limit of the code, not a defect of the decoder.

use crate::{FrameError, Result};
use linklab_core::bits::{bits_to_bytes, bytes_to_bits};

/// Hamming SECDED codec over a fixed data-bit granularity.
#[derive(Debug, Clone)]
pub struct Hamming {
    data_bits: usize,
    parity_bits: usize,
}

impl Default for Hamming {
    /// The classic Hamming(7,4) geometry.
    fn default() -> Self {
        Self {
            data_bits: 4,
            parity_bits: parity_count(4),
        }
    }
}

impl Hamming {
    /// Create a codec over `data_bits` data bits per block.
    pub fn new(data_bits: usize) -> Result<Self> {
        if data_bits == 0 {
            return Err(FrameError::InvalidBlockSize { size: data_bits });
        }
        Ok(Self {
            data_bits,
            parity_bits: parity_count(data_bits),
        })
    }

    /// Data bits per block.
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// Coded bits per block.
    pub fn block_len(&self) -> usize {
        self.data_bits + self.parity_bits
    }

    /// Encode one block of data bits. Missing bits of a short final chunk
    /// read as 0.
    pub fn encode_block(&self, data: &[u8]) -> Vec<u8> {
        let n = self.block_len();
        let mut block = vec![0u8; n + 1]; // 1-indexed

        let mut next = 0;
        for pos in 1..=n {
            if !pos.is_power_of_two() {
                block[pos] = data.get(next).map_or(0, |&bit| bit & 1);
                next += 1;
            }
        }

        // Each parity position participates in its own mask but still holds
        // 0 here, so computing them in any order is equivalent.
        for exponent in 0..self.parity_bits {
            let parity_pos = 1 << exponent;
            let mut parity = 0;
            for pos in 1..=n {
                if pos & parity_pos != 0 {
                    parity ^= block[pos];
                }
            }
            block[parity_pos] = parity;
        }

        block.split_off(1)
    }

    /// Decode one coded block, repairing at most one flipped bit. Returns
    /// the data bits and the syndrome (0 means no error was seen).
    pub fn decode_block(&self, coded: &[u8]) -> (Vec<u8>, usize) {
        let n = coded.len();
        let mut block = vec![0u8; n + 1];
        for (pos, &bit) in coded.iter().enumerate() {
            block[pos + 1] = bit & 1;
        }

        let mut checks = 0;
        while (1 << checks) < n + 1 {
            checks += 1;
        }

        let mut syndrome = 0;
        for exponent in 0..checks {
            let parity_pos = 1 << exponent;
            let mut parity = 0;
            for pos in 1..=n {
                if pos & parity_pos != 0 {
                    parity ^= block[pos];
                }
            }
            if parity != 0 {
                syndrome += parity_pos;
            }
        }

        if syndrome != 0 && syndrome <= n {
            block[syndrome] ^= 1;
        }

        let data = (1..=n)
            .filter(|pos| !pos.is_power_of_two())
            .map(|pos| block[pos])
            .collect();
        (data, syndrome)
    }

    /// Slice a byte stream into data chunks (zero-padding the last one) and
    /// encode each; the result is the coded bit stream.
    pub fn add(&self, data: &[u8]) -> Vec<u8> {
        let bits = bytes_to_bits(data);
        let blocks = (bits.len() + self.data_bits - 1) / self.data_bits;
        let mut coded = Vec::with_capacity(blocks * self.block_len());
        for chunk in bits.chunks(self.data_bits) {
            coded.extend(self.encode_block(chunk));
        }
        coded
    }

    /// Decode a coded bit stream back into bytes, counting the blocks that
    /// needed repair. A trailing partial block and data bits short of a
    /// whole byte are dropped.
    pub fn verify(&self, coded: &[u8]) -> (Vec<u8>, usize) {
        let mut data_bits = Vec::with_capacity(coded.len());
        let mut corrected = 0;
        for chunk in coded.chunks_exact(self.block_len()) {
            let (bits, syndrome) = self.decode_block(chunk);
            data_bits.extend(bits);
            if syndrome != 0 {
                corrected += 1;
            }
        }
        (bits_to_bytes(&data_bits), corrected)
    }
}

/// Smallest r with 2^r >= m + r + 1.
fn parity_count(data_bits: usize) -> usize {
    let mut r = 0;
    while (1 << r) < data_bits + r + 1 {
        r += 1;
    }
    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nibble_bits(value: u8) -> Vec<u8> {
        (0..4).rev().map(|shift| (value >> shift) & 1).collect()
    }

    #[test]
    fn seven_four_geometry() {
        let hamming = Hamming::default();
        assert_eq!(hamming.data_bits(), 4);
        assert_eq!(hamming.block_len(), 7);
        assert_eq!(parity_count(8), 4);
        assert_eq!(parity_count(11), 4);
    }

    #[test]
    fn known_codeword_layout() {
        // Data 1011 -> P1 P2 D1 P4 D2 D3 D4 = 0 1 1 0 0 1 1.
        let hamming = Hamming::default();
        assert_eq!(hamming.encode_block(&[1, 0, 1, 1]), vec![0, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn clean_blocks_have_zero_syndrome() {
        let hamming = Hamming::default();
        for value in 0u8..16 {
            let data = nibble_bits(value);
            let coded = hamming.encode_block(&data);
            assert_eq!(hamming.decode_block(&coded), (data, 0), "nibble {value:04b}");
        }
    }

    #[test]
    fn every_single_flip_is_corrected() {
        let hamming = Hamming::default();
        for value in 0u8..16 {
            let data = nibble_bits(value);
            let coded = hamming.encode_block(&data);
            for position in 1..=7 {
                let mut corrupted = coded.clone();
                corrupted[position - 1] ^= 1;
                let (decoded, syndrome) = hamming.decode_block(&corrupted);
                assert_eq!(syndrome, position, "nibble {value:04b} flip {position}");
                assert_eq!(decoded, data, "nibble {value:04b} flip {position}");
            }
        }
    }

    #[test]
    fn byte_stream_round_trip() {
        let hamming = Hamming::default();
        let coded = hamming.add(&[65, 66]);
        // Two blocks per byte, seven bits per block.
        assert_eq!(coded.len(), 28);
        assert_eq!(hamming.verify(&coded), (vec![65, 66], 0));
    }

    #[test]
    fn one_flipped_coded_bit_is_repaired() {
        let hamming = Hamming::default();
        let mut coded = hamming.add(&[65, 66]);
        coded[10] ^= 1;
        assert_eq!(hamming.verify(&coded), (vec![65, 66], 1));
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        let hamming = Hamming::default();
        let mut coded = hamming.add(&[65, 66]);
        coded.extend_from_slice(&[0, 0, 0]);
        assert_eq!(hamming.verify(&coded), (vec![65, 66], 0));
    }

    #[test]
    fn zero_data_bits_is_rejected() {
        assert!(Hamming::new(0).is_err());
    }
}
