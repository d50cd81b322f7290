// field.rs
//
// Copyright (c) 2026  gifcut developers
//
//! Little-endian integers and packed bit-fields

/// Decode a little-endian `u16` from the first two bytes
pub(crate) fn u16_le(buf: &[u8]) -> u16 {
    u16::from(buf[1]) << 8 | u16::from(buf[0])
}

/// Decode a little-endian `u32` from the first four bytes
pub(crate) fn u32_le(buf: &[u8]) -> u32 {
    u32::from(buf[3]) << 24
        | u32::from(buf[2]) << 16
        | u32::from(buf[1]) << 8
        | u32::from(buf[0])
}

/// Append a little-endian `u16`
pub(crate) fn push_u16_le(buf: &mut Vec<u8>, v: u16) {
    buf.push(v as u8);
    buf.push((v >> 8) as u8);
}

/// Append a little-endian `u32`
pub(crate) fn push_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.push(v as u8);
    buf.push((v >> 8) as u8);
    buf.push((v >> 16) as u8);
    buf.push((v >> 24) as u8);
}

/// Extract a bit-field from a packed byte.
///
/// The mask selects the field; the result is shifted down to bit 0.
pub(crate) fn unpack(flags: u8, mask: u8) -> u8 {
    (flags & mask) >> mask.trailing_zeros()
}

/// Store a bit-field into a packed byte, leaving other bits untouched
pub(crate) fn pack(flags: u8, mask: u8, value: u8) -> u8 {
    (flags & !mask) | ((value << mask.trailing_zeros()) & mask)
}

/// Decompose a byte into bits, most significant first
pub fn bits(byte: u8) -> [bool; 8] {
    let mut b = [false; 8];
    for (i, bit) in b.iter_mut().enumerate() {
        *bit = byte & (0x80 >> i) != 0;
    }
    b
}
