// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Big-endian scalar writer/reader.

use bytes::{Buf, BufMut};

use super::read::ReadError;

/// Fixed-size record encoding.
pub(crate) trait Encode {
    /// Appends the record to `writer`.
    fn encode(&self, writer: &mut Writer);
}

/// Fixed-size record decoding.
pub(crate) trait Decode: Sized {
    /// Reads one record from `reader`.
    fn decode(reader: &mut Reader<'_>) -> Result<Self, ReadError>;
}

/// Growable big-endian output buffer.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub(crate) fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub(crate) fn write_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub(crate) fn write_i16(&mut self, value: i16) {
        self.buf.put_i16(value);
    }

    pub(crate) fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub(crate) fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub(crate) fn write_f32(&mut self, value: f32) {
        self.buf.put_f32(value);
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked big-endian reader over one section of a file.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    section: &'static str,
}

impl<'a> Reader<'a> {
    /// Reader positioned at `offset`, naming `section` in errors.
    pub(crate) fn at(bytes: &'a [u8], offset: usize, section: &'static str) -> Self {
        Self {
            bytes,
            offset,
            section,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let eof = || ReadError::UnexpectedEof {
            section: self.section,
            offset: self.offset as u64,
            needed: len as u64,
            available: self.bytes.len().saturating_sub(self.offset) as u64,
        };
        let end = self.offset.checked_add(len).ok_or_else(eof)?;
        let out = self.bytes.get(self.offset..end).ok_or_else(eof)?;
        self.offset = end;
        Ok(out)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0u8; N];
        self.take(N)?.copy_to_slice(&mut out);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?.get_u8())
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, ReadError> {
        Ok(self.take(2)?.get_u16())
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, ReadError> {
        Ok(self.take(2)?.get_i16())
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, ReadError> {
        Ok(self.take(4)?.get_u32())
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, ReadError> {
        Ok(self.take(4)?.get_i32())
    }

    pub(crate) fn read_f32(&mut self) -> Result<f32, ReadError> {
        Ok(self.take(4)?.get_f32())
    }

    /// Decodes `count` consecutive records.
    pub(crate) fn read_records<T: Decode>(&mut self, count: usize) -> Result<Vec<T>, ReadError> {
        (0..count).map(|_| T::decode(self)).collect()
    }
}
