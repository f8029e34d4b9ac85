//! 7-bit-safe packing of 24-bit colors
//!
//! Serato stores colors in 4 bytes with the top bit of every byte clear:
//!
//! ```text
//! r: rrrrrrrr  g: gggggggg  b: bbbbbbbb
//! w: 00000rrr  x: 0rrrrrgg  y: 0ggggggb  z: 0bbbbbbb
//! ```

use crate::types::Rgb;

/// Pack an RGB triple into 4 bytes, each with bit 7 clear
pub const fn pack_rgb(rgb: Rgb) -> [u8; 4] {
    let Rgb { r, g, b } = rgb;
    let w = r >> 5;
    let x = ((g >> 6) | (r << 2)) & 0x7F;
    let y = ((b >> 7) | (g << 1)) & 0x7F;
    let z = b & 0x7F;
    [w, x, y, z]
}

/// Unpack 4 packed bytes into an RGB triple
pub const fn unpack_rgb(packed: [u8; 4]) -> Rgb {
    let [w, x, y, z] = packed;
    let b = (z & 0x7F) | ((y & 0x01) << 7);
    let g = ((y >> 1) & 0x7F) | ((x & 0x03) << 6);
    let r = ((x >> 2) & 0x7F) | ((w & 0x07) << 5);
    Rgb { r, g, b }
}
