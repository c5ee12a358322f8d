//! Text and identifier operations.
//!
//! Length-prefixed strings store the encoded byte length first: one byte
//! for the `_byte` variants, a `u16` under the access byte order for the
//! `_short` variants. The payload follows immediately after the prefix.

use super::Access;
use crate::error::{AccessError, AccessResult, Permission};
use ioaccess_codec::TextEncoding;
use uuid::Uuid;

const BYTE_PREFIX_MAX: usize = u8::MAX as usize;
const SHORT_PREFIX_MAX: usize = u16::MAX as usize;

impl Access {
    /// Checks a prefixed write of `len` payload bytes, at `index` when given
    /// and at the cursor otherwise. The length limit is checked before room.
    fn check_prefixed(&self, at: Option<(&str, u64)>, len: usize, prefix: u64, max: usize) -> AccessResult<()> {
        self.check_live()?;
        self.check_permission(Permission::Write)?;
        if let Some((operation, _)) = at {
            self.check_indexed(operation)?;
        }
        if len > max {
            return Err(AccessError::EncodingTooLong { len, max });
        }
        let position = at.map_or(self.cursor, |(_, index)| index);
        self.check_span(position, prefix + len as u64)
    }

    /// Encodes `text` and writes it at the cursor without a prefix.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write_string(&mut self, text: &str, encoding: TextEncoding) -> AccessResult<usize> {
        let bytes = encoding.encode(text);
        self.write_bytes(&bytes)?;
        Ok(bytes.len())
    }

    /// Encodes `text` and writes it at `index` without a prefix.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set_string(&mut self, index: u64, text: &str, encoding: TextEncoding) -> AccessResult<usize> {
        let bytes = encoding.encode(text);
        self.set_bytes(index, &bytes)?;
        Ok(bytes.len())
    }

    /// Reads `len` bytes at the cursor and decodes them.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_string(&mut self, len: usize, encoding: TextEncoding) -> AccessResult<String> {
        Ok(encoding.decode(&self.read_bytes(len)?))
    }

    /// Reads `len` bytes at `index` and decodes them.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_string(&mut self, index: u64, len: usize, encoding: TextEncoding) -> AccessResult<String> {
        Ok(encoding.decode(&self.get_bytes(index, len)?))
    }

    /// Writes `text` with a one-byte length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::EncodingTooLong`] if the encoding exceeds 255
    /// bytes. Nothing is written in that case.
    pub fn write_string_byte(&mut self, text: &str, encoding: TextEncoding) -> AccessResult<()> {
        let bytes = encoding.encode(text);
        self.check_prefixed(None, bytes.len(), 1, BYTE_PREFIX_MAX)?;
        self.write_u8(bytes.len() as u8)?;
        self.write_bytes(&bytes)
    }

    /// Writes `text` at `index` with a one-byte length prefix. The payload
    /// starts at `index + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::EncodingTooLong`] if the encoding exceeds 255
    /// bytes. Nothing is written in that case.
    pub fn set_string_byte(&mut self, index: u64, text: &str, encoding: TextEncoding) -> AccessResult<()> {
        let bytes = encoding.encode(text);
        self.check_prefixed(Some(("set_string_byte", index)), bytes.len(), 1, BYTE_PREFIX_MAX)?;
        self.set_u8(index, bytes.len() as u8)?;
        self.set_bytes(index + 1, &bytes)
    }

    /// Reads a string written by [`write_string_byte`](Self::write_string_byte).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_string_byte(&mut self, encoding: TextEncoding) -> AccessResult<String> {
        let len = self.read_u8()?;
        self.read_string(usize::from(len), encoding)
    }

    /// Reads a string written by [`set_string_byte`](Self::set_string_byte).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_string_byte(&mut self, index: u64, encoding: TextEncoding) -> AccessResult<String> {
        let len = self.get_u8(index)?;
        self.get_string(index + 1, usize::from(len), encoding)
    }

    /// Writes `text` with a two-byte length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::EncodingTooLong`] if the encoding exceeds
    /// 65535 bytes. Nothing is written in that case.
    pub fn write_string_short(&mut self, text: &str, encoding: TextEncoding) -> AccessResult<()> {
        let bytes = encoding.encode(text);
        self.check_prefixed(None, bytes.len(), 2, SHORT_PREFIX_MAX)?;
        self.write_u16(bytes.len() as u16)?;
        self.write_bytes(&bytes)
    }

    /// Writes `text` at `index` with a two-byte length prefix. The payload
    /// starts at `index + 2`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::EncodingTooLong`] if the encoding exceeds
    /// 65535 bytes. Nothing is written in that case.
    pub fn set_string_short(&mut self, index: u64, text: &str, encoding: TextEncoding) -> AccessResult<()> {
        let bytes = encoding.encode(text);
        self.check_prefixed(Some(("set_string_short", index)), bytes.len(), 2, SHORT_PREFIX_MAX)?;
        self.set_u16(index, bytes.len() as u16)?;
        self.set_bytes(index + 2, &bytes)
    }

    /// Reads a string written by [`write_string_short`](Self::write_string_short).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_string_short(&mut self, encoding: TextEncoding) -> AccessResult<String> {
        let len = self.read_u16()?;
        self.read_string(usize::from(len), encoding)
    }

    /// Reads a string written by [`set_string_short`](Self::set_string_short).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_string_short(&mut self, index: u64, encoding: TextEncoding) -> AccessResult<String> {
        let len = self.get_u16(index)?;
        self.get_string(index + 2, usize::from(len), encoding)
    }

    /// Writes `id` as two `u64` values, most significant half first.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write_uuid(&mut self, id: Uuid) -> AccessResult<()> {
        self.check_sequential(Permission::Write, 16)?;
        let (high, low) = id.as_u64_pair();
        self.write_u64(high)?;
        self.write_u64(low)
    }

    /// Reads an identifier written by [`write_uuid`](Self::write_uuid).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_uuid(&mut self) -> AccessResult<Uuid> {
        self.check_sequential(Permission::Read, 16)?;
        let high = self.read_u64()?;
        let low = self.read_u64()?;
        Ok(Uuid::from_u64_pair(high, low))
    }

    /// Writes `id` at `index` as two `u64` values, most significant half first.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set_uuid(&mut self, index: u64, id: Uuid) -> AccessResult<()> {
        self.check_at(Permission::Write, "set_uuid", index, 16)?;
        let (high, low) = id.as_u64_pair();
        self.set_u64(index, high)?;
        self.set_u64(index + 8, low)
    }

    /// Reads an identifier written by [`set_uuid`](Self::set_uuid).
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_uuid(&mut self, index: u64) -> AccessResult<Uuid> {
        self.check_at(Permission::Read, "get_uuid", index, 16)?;
        let high = self.get_u64(index)?;
        let low = self.get_u64(index + 8)?;
        Ok(Uuid::from_u64_pair(high, low))
    }
}
