//! Primitive byte codecs shared by both tag formats
//!
//! Integers are big-endian. Text is UTF-16BE with no byte-order mark and no
//! terminator; it is handled by swapping byte pairs and reading the result as
//! little-endian code units.

use crate::error::TagError;
use alloc::string::String;
use alloc::vec::Vec;

fn ensure_len(data: &[u8], expected: usize) -> Result<(), TagError> {
    if data.len() < expected {
        return Err(TagError::truncated(expected, data.len()));
    }
    Ok(())
}

/// Decode a single-byte boolean (any non-zero byte is true)
pub fn decode_bool(data: &[u8]) -> Result<bool, TagError> {
    ensure_len(data, 1)?;
    Ok(data[0] != 0)
}

/// Encode a boolean as `0x01` or `0x00`
pub const fn encode_bool(value: bool) -> [u8; 1] {
    [value as u8]
}

/// Decode a big-endian u16
pub fn decode_u16be(data: &[u8]) -> Result<u16, TagError> {
    ensure_len(data, 2)?;
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// Encode a big-endian u16
pub const fn encode_u16be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Decode a big-endian u32
pub fn decode_u32be(data: &[u8]) -> Result<u32, TagError> {
    ensure_len(data, 4)?;
    Ok(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
}

/// Encode a big-endian u32
pub const fn encode_u32be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

fn swap_pairs_in_place(data: &mut [u8]) {
    for pair in data.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Swap every adjacent pair of bytes
///
/// Fails with [`TagError::OddLength`] if `data` has an odd number of bytes.
pub fn swap_byte_pairs(data: &[u8]) -> Result<Vec<u8>, TagError> {
    if data.len() % 2 != 0 {
        return Err(TagError::OddLength(data.len()));
    }
    let mut swapped = data.to_vec();
    swap_pairs_in_place(&mut swapped);
    Ok(swapped)
}

/// Decode UTF-16BE text
pub fn decode_utf16be(data: &[u8]) -> Result<String, TagError> {
    let swapped = swap_byte_pairs(data)?;
    let units = swapped
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| TagError::InvalidUtf16 {
            unit: e.unpaired_surrogate(),
        })
}

/// Encode text as UTF-16BE without BOM or terminator
pub fn encode_utf16be(text: &str) -> Vec<u8> {
    let mut encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    swap_pairs_in_place(&mut encoded);
    encoded
}
