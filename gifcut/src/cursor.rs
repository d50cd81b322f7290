// cursor.rs
//
// Copyright (c) 2026  gifcut developers
//
use crate::error::{Error, Result};
use crate::field;

/// Sequential reader over an immutable byte buffer
#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    /// Data being read
    buf: &'a [u8],
    /// Offset of next unread byte
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of a buffer
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// Get the current offset
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed
    pub fn is_done(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read up to `n` bytes, advancing past them.
    ///
    /// Near the end of the buffer the returned slice may be shorter than
    /// requested (or empty).
    pub fn read(&mut self, n: usize) -> &'a [u8] {
        let buf = self.peek(n);
        self.pos += buf.len();
        buf
    }

    /// Read exactly `n` bytes.
    ///
    /// On truncation nothing is consumed.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.peek(n).len() == n {
            Ok(self.read(n))
        } else {
            Err(Error::UnexpectedEndOfData)
        }
    }

    /// Look at up to `n` bytes without consuming them
    pub fn peek(&self, n: usize) -> &'a [u8] {
        let start = self.pos.min(self.buf.len());
        let end = self.pos.saturating_add(n).min(self.buf.len());
        &self.buf[start..end]
    }

    /// Check whether the next bytes match a signature, without consuming
    pub fn starts_with(&self, signature: &[u8]) -> bool {
        self.peek(signature.len()) == signature
    }

    /// Read one byte
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Read a little-endian `u16`
    pub fn u16_le(&mut self) -> Result<u16> {
        Ok(field::u16_le(self.read_exact(2)?))
    }

    /// Read a chain of length-prefixed sub-blocks.
    ///
    /// Consumes the zero-length terminator; it is not included.
    pub fn sub_blocks(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut blocks = vec![];
        loop {
            let sz = self.u8()?;
            if sz == 0 {
                return Ok(blocks);
            }
            blocks.push(self.read_exact(sz.into())?.to_vec());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_reads() {
        let mut c = Cursor::new(&[1, 2, 3]);
        assert_eq!(c.peek(2), [1, 2]);
        assert_eq!(c.pos(), 0);
        assert_eq!(c.read(2), [1, 2]);
        assert_eq!(c.read(5), [3]);
        assert!(c.is_done());
        assert!(c.read(1).is_empty());
        assert!(c.peek(3).is_empty());
    }

    #[test]
    fn exact_reads() {
        let mut c = Cursor::new(&[0x34, 0x12, 0xFF]);
        assert_eq!(c.u16_le().unwrap(), 0x1234);
        assert!(matches!(c.u16_le(), Err(Error::UnexpectedEndOfData)));
        // truncated read does not consume
        assert_eq!(c.pos(), 2);
        assert_eq!(c.u8().unwrap(), 0xFF);
        assert!(matches!(c.u8(), Err(Error::UnexpectedEndOfData)));
    }

    #[test]
    fn signature() {
        let c = Cursor::new(&[0x21, 0xF9]);
        assert!(c.starts_with(&[0x21]));
        assert!(!c.starts_with(&[0x21, 0xF9, 0x04]));
    }

    #[test]
    fn sub_block_chain() {
        let mut c = Cursor::new(&[2, b'h', b'i', 1, b'!', 0, 0x3B]);
        let blocks = c.sub_blocks().unwrap();
        assert_eq!(blocks, vec![b"hi".to_vec(), b"!".to_vec()]);
        assert_eq!(c.peek(1), [0x3B]);
        let mut c = Cursor::new(&[4, b'a']);
        assert!(c.sub_blocks().is_err());
    }
}
