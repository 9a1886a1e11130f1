//! Primitive readers and writers for the Kafka wire format.
//!
//! Every message in this crate is built from the helpers here: fixed-width
//! big-endian integers, unsigned and zigzag varints, the "compact" string and
//! array encodings (length stored as `len + 1`, zero meaning null) and the
//! tagged-field section that trails flexible structures.
//!
//! Readers never panic on short input. They check the remaining length first
//! and report [`ProtocolError::TruncatedInput`] instead.

use bytes::{Buf, BufMut, Bytes};
use thiserror::Error;
use uuid::Uuid;

/// Longest encoding of a 64-bit varint.
const MAX_VARINT_BYTES: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    #[error("varint longer than 10 bytes")]
    VarintOverflow,

    #[error("invalid length: {0}")]
    InvalidLength(i64),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Checked decoding on top of [`bytes::Buf`].
pub trait KafkaBuf: Buf {
    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(ProtocolError::TruncatedInput { needed, remaining });
        }
        Ok(())
    }

    fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        Ok(self.get_i8())
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.get_u8())
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.ensure(2)?;
        Ok(self.get_i16())
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        Ok(self.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        Ok(self.get_i64())
    }

    fn read_uuid(&mut self) -> Result<Uuid> {
        self.ensure(16)?;
        let mut raw = [0u8; 16];
        self.copy_to_slice(&mut raw);
        Ok(Uuid::from_bytes(raw))
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        Ok(self.copy_to_bytes(len))
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.ensure(len)?;
        self.advance(len);
        Ok(())
    }

    /// Base-128 varint, least significant group first.
    fn read_unsigned_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ProtocolError::VarintOverflow)
    }

    /// Zigzag-encoded signed varint.
    fn read_varint(&mut self) -> Result<i64> {
        let raw = self.read_unsigned_varint()?;
        Ok((raw >> 1) as i64 ^ -((raw & 1) as i64))
    }

    /// Compact length: `None` for null, otherwise the stored value minus one.
    fn read_compact_length(&mut self) -> Result<Option<usize>> {
        match self.read_unsigned_varint()? {
            0 => Ok(None),
            raw => usize::try_from(raw - 1)
                .map(Some)
                .map_err(|_| ProtocolError::InvalidLength(raw as i64)),
        }
    }

    fn read_string_of(&mut self, len: usize) -> Result<String> {
        let raw = self.read_bytes(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }

    fn read_compact_nullable_string(&mut self) -> Result<Option<String>> {
        match self.read_compact_length()? {
            Some(len) => self.read_string_of(len).map(Some),
            None => Ok(None),
        }
    }

    fn read_compact_string(&mut self) -> Result<String> {
        self.read_compact_nullable_string()?
            .ok_or(ProtocolError::InvalidLength(-1))
    }

    /// Classic nullable string: int16 length, -1 for null.
    fn read_nullable_string(&mut self) -> Result<Option<String>> {
        match self.read_i16()? {
            -1 => Ok(None),
            len if len < 0 => Err(ProtocolError::InvalidLength(len.into())),
            len => self.read_string_of(len as usize).map(Some),
        }
    }

    /// Compact array; a null array decodes as empty.
    fn read_compact_array<T, F>(&mut self, mut read_item: F) -> Result<Vec<T>>
    where
        Self: Sized,
        F: FnMut(&mut Self) -> Result<T>,
    {
        let Some(len) = self.read_compact_length()? else {
            return Ok(Vec::new());
        };
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(read_item(self)?);
        }
        Ok(items)
    }

    fn read_compact_i32_array(&mut self) -> Result<Vec<i32>>
    where
        Self: Sized,
    {
        self.read_compact_array(|buf| buf.read_i32())
    }

    /// Consumes a tagged-field section. Field contents are not interpreted.
    fn skip_tagged_fields(&mut self) -> Result<()> {
        let count = self.read_unsigned_varint()?;
        for _ in 0..count {
            let _tag = self.read_unsigned_varint()?;
            let size = self.read_unsigned_varint()?;
            let size = usize::try_from(size).map_err(|_| ProtocolError::InvalidLength(size as i64))?;
            self.skip(size)?;
        }
        Ok(())
    }
}

impl<B: Buf> KafkaBuf for B {}

/// Encoding counterparts of [`KafkaBuf`].
pub trait KafkaBufMut: BufMut {
    fn put_unsigned_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.put_u8(value as u8);
    }

    fn put_varint(&mut self, value: i64) {
        self.put_unsigned_varint(((value << 1) ^ (value >> 63)) as u64);
    }

    fn put_compact_length(&mut self, len: usize) {
        self.put_unsigned_varint(len as u64 + 1);
    }

    fn put_compact_string(&mut self, value: &str) {
        self.put_compact_length(value.len());
        self.put_slice(value.as_bytes());
    }

    /// Request-header client id layout; only requests carry it.
    #[cfg(test)]
    fn put_nullable_string(&mut self, value: Option<&str>) {
        match value {
            Some(value) => {
                self.put_i16(value.len() as i16);
                self.put_slice(value.as_bytes());
            }
            None => self.put_i16(-1),
        }
    }

    fn put_compact_array<T, F>(&mut self, items: &[T], mut put_item: F)
    where
        Self: Sized,
        F: FnMut(&mut Self, &T),
    {
        self.put_compact_length(items.len());
        for item in items {
            put_item(self, item);
        }
    }

    fn put_compact_i32_array(&mut self, items: &[i32])
    where
        Self: Sized,
    {
        self.put_compact_array(items, |buf, item| buf.put_i32(*item));
    }

    /// Classic array with an int32 element count.
    fn put_array<T, F>(&mut self, items: &[T], mut put_item: F)
    where
        Self: Sized,
        F: FnMut(&mut Self, &T),
    {
        self.put_i32(items.len() as i32);
        for item in items {
            put_item(self, item);
        }
    }

    fn put_uuid(&mut self, id: &Uuid) {
        self.put_slice(id.as_bytes());
    }

    fn put_empty_tagged_fields(&mut self) {
        self.put_u8(0);
    }
}

impl<B: BufMut> KafkaBufMut for B {}
