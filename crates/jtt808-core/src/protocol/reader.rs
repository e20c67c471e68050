//! Bounds-checked cursor over a message body.
//!
//! Every read checks the remaining declared length first and fails with
//! [`ProtocolError::Truncated`] naming the field, so a short body aborts only
//! the message being decoded.

use bytes::Buf;
use chrono::{NaiveDate, NaiveDateTime};

use crate::protocol::bcd;
use crate::protocol::error::ProtocolError;

/// Cursor over one message body (or one sub-record of it).
#[derive(Debug, Clone)]
pub struct BodyReader<'a> {
    buf: &'a [u8],
}

impl<'a> BodyReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn require(&self, needed: usize, field: &'static str) -> Result<(), ProtocolError> {
        if self.buf.remaining() < needed {
            return Err(ProtocolError::Truncated {
                field,
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, ProtocolError> {
        self.require(1, field)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16, ProtocolError> {
        self.require(2, field)?;
        Ok(self.buf.get_u16())
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32, ProtocolError> {
        self.require(4, field)?;
        Ok(self.buf.get_u32())
    }

    pub fn i32(&mut self, field: &'static str) -> Result<i32, ProtocolError> {
        self.require(4, field)?;
        Ok(self.buf.get_i32())
    }

    /// Borrows the next `len` bytes.
    pub fn bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], ProtocolError> {
        self.require(len, field)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], ProtocolError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, field)?);
        Ok(out)
    }

    /// Borrows everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }

    /// Splits off a sub-reader over the next `len` bytes.
    pub fn sub_reader(&mut self, len: usize, field: &'static str) -> Result<BodyReader<'a>, ProtocolError> {
        self.bytes(len, field).map(BodyReader::new)
    }

    /// Fixed-width text field.
    pub fn text(&mut self, len: usize, field: &'static str) -> Result<String, ProtocolError> {
        self.bytes(len, field).map(decode_text)
    }

    /// Text field prefixed by a one-byte length.
    pub fn text_u8(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        let len = self.u8(field)? as usize;
        self.text(len, field)
    }

    /// Everything that is left, as text.
    pub fn rest_text(&mut self) -> String {
        decode_text(self.rest())
    }

    /// Fixed-width BCD digits.
    pub fn bcd(&mut self, len: usize, field: &'static str) -> Result<String, ProtocolError> {
        self.bytes(len, field).map(bcd::decode_digits)
    }

    /// 6-byte BCD `YYMMDDhhmmss`.
    pub fn datetime(&mut self, field: &'static str) -> Result<Option<NaiveDateTime>, ProtocolError> {
        let raw = self.array::<6>(field)?;
        Ok(bcd::decode_datetime(&raw))
    }

    /// 4-byte BCD `YYYYMMDD`.
    pub fn date(&mut self, field: &'static str) -> Result<Option<NaiveDate>, ProtocolError> {
        let raw = self.array::<4>(field)?;
        Ok(bcd::decode_date(&raw))
    }
}

/// Lossy UTF-8 with the NUL and space padding terminals use stripped.
pub fn decode_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(&['\0', ' '][..])
        .to_string()
}
