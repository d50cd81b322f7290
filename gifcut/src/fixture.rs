// fixture.rs
//
// Copyright (c) 2026  gifcut developers
//
//! GIF data for tests

/// 10x10 image with a 4 entry global color table and one frame
pub const SIMPLE: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00, 0x0A, 0x00, 0x91, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
    0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x0A, 0x00, 0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
    0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75, 0xEC, 0x95, 0xFA, 0xA8,
    0xDE, 0x60, 0x8C, 0x04, 0x91, 0x4C, 0x01, 0x00, 0x3B,
];

/// Header, screen descriptor and global color table of `SIMPLE`
pub fn preamble() -> Vec<u8> {
    SIMPLE[..25].to_vec()
}

/// Graphic control extension with a delay
pub fn graphic_control(delay: u16) -> Vec<u8> {
    vec![0x21, 0xF9, 0x04, 0x04, delay as u8, (delay >> 8) as u8, 0x00, 0x00]
}

/// Image descriptor (without local color table) and compressed body
pub fn image(left: u16, top: u16) -> Vec<u8> {
    let mut v = vec![0x2C, left as u8, (left >> 8) as u8, top as u8];
    v.push((top >> 8) as u8);
    v.extend_from_slice(&SIMPLE[38..68]);
    v
}

/// `NETSCAPE2.0` extension with a loop count
pub fn netscape(loop_count: u16) -> Vec<u8> {
    let mut v = vec![0x21, 0xFF, 0x0B];
    v.extend_from_slice(b"NETSCAPE2.0");
    v.extend_from_slice(&[3, 1, loop_count as u8, (loop_count >> 8) as u8, 0]);
    v
}

/// Comment extension with one sub-block
pub fn comment(text: &[u8]) -> Vec<u8> {
    let mut v = vec![0x21, 0xFE, text.len() as u8];
    v.extend_from_slice(text);
    v.push(0);
    v
}

/// Two frame animation, looping forever, 50 cs delay
pub fn animated() -> Vec<u8> {
    let mut v = preamble();
    v.extend(netscape(0));
    v.extend(comment(b"gifcut"));
    v.extend(graphic_control(50));
    v.extend(image(0, 0));
    v.extend(graphic_control(50));
    v.extend(image(0, 0));
    v.push(0x3B);
    v
}

/// One frame with extension blocks before and inside the frame
pub fn with_extensions() -> Vec<u8> {
    let mut v = preamble();
    v.extend(netscape(3));
    v.extend(comment(b"a"));
    v.extend_from_slice(&SIMPLE[25..33]);
    // comment with two sub-blocks
    v.extend_from_slice(&[0x21, 0xFE, 1, b'b', 2, b'c', b'd', 0]);
    // plain text: 8x4 grid of 1x2 cells
    v.extend_from_slice(&[0x21, 0x01, 0x0C, 0, 0, 0, 0, 8, 0, 4, 0]);
    v.extend_from_slice(&[1, 2, 1, 0, 3, b'h', b'i', 0, 0]);
    v.extend_from_slice(&SIMPLE[33..]);
    v
}
