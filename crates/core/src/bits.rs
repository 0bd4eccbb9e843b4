//! Conversions between text, bit streams and byte streams
//!
//! Bit streams are `Vec<u8>` holding only 0 and 1, most significant bit
//! first within each byte. Order is preserved end-to-end; every layer of
//! the stack speaks one of these two representations at its seams.

/// Convert text to a bit stream, 8 bits per input byte, MSB first.
pub fn text_to_bits(text: &str) -> Vec<u8> {
    bytes_to_bits(text.as_bytes())
}

/// Convert a bit stream back to text.
///
/// Bits are grouped into bytes; a trailing group shorter than 8 bits is
/// dropped. Only printable ASCII (32..=126) survives, so corrupted bytes
/// disappear from the output instead of rendering as garbage.
pub fn bits_to_text(bits: &[u8]) -> String {
    bits_to_bytes(bits)
        .into_iter()
        .filter(|b| (32..=126).contains(b))
        .map(char::from)
        .collect()
}

/// Expand bytes to bits, MSB first. Output length is exactly 8x input length.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// Pack bits into bytes, MSB first. A trailing group shorter than 8 bits
/// is dropped.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | (bit & 1)))
        .collect()
}

/// Pack bits into bytes, zero-padding a trailing partial group up to a
/// whole byte. Used when a bit-granular stage feeds a byte-granular one.
pub fn bits_to_bytes_padded(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((bits.len() + 7) / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}
