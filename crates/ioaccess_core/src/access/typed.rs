//! Typed and single-byte operations.

use super::Access;
use crate::error::{AccessResult, Permission};
use ioaccess_codec::Primitive;

impl Access {
    /// Reads a `T` at the cursor and advances the cursor by `T::WIDTH`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_value<T: Primitive>(&mut self) -> AccessResult<T> {
        let width = T::WIDTH as u64;
        self.check_sequential(Permission::Read, width)?;
        // SAFETY: native accesses are bounded by their window length, and
        // check_sequential has confirmed cursor + WIDTH <= length.
        let value = unsafe { self.backing.read_value(self.cursor, self.byte_order) }?;
        self.advance(width);
        Ok(value)
    }

    /// Writes a `T` at the cursor and advances the cursor by `T::WIDTH`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write_value<T: Primitive>(&mut self, value: T) -> AccessResult<()> {
        let width = T::WIDTH as u64;
        self.check_sequential(Permission::Write, width)?;
        // SAFETY: as in read_value.
        unsafe { self.backing.write_value(self.cursor, value, self.byte_order) }?;
        self.advance(width);
        Ok(())
    }

    /// Reads a `T` at `index`. The cursor does not move.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_value<T: Primitive>(&mut self, index: u64) -> AccessResult<T> {
        self.check_at(Permission::Read, "get", index, T::WIDTH as u64)?;
        // SAFETY: check_at has confirmed index + WIDTH <= length.
        unsafe { self.backing.get_value(index, self.byte_order) }
    }

    /// Writes a `T` at `index`. The cursor does not move.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set_value<T: Primitive>(&mut self, index: u64, value: T) -> AccessResult<()> {
        self.check_at(Permission::Write, "set", index, T::WIDTH as u64)?;
        // SAFETY: check_at has confirmed index + WIDTH <= length.
        unsafe { self.backing.set_value(index, value, self.byte_order) }
    }

    /// Reads one byte at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read(&mut self) -> AccessResult<u8> {
        self.read_value()
    }

    /// Writes one byte at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write(&mut self, byte: u8) -> AccessResult<()> {
        self.write_value(byte)
    }

    /// Reads the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get(&mut self, index: u64) -> AccessResult<u8> {
        self.get_value(index)
    }

    /// Writes `byte` at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set(&mut self, index: u64, byte: u8) -> AccessResult<()> {
        self.set_value(index, byte)
    }

    /// Reads `len` bytes at the cursor and advances past them.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_bytes(&mut self, len: usize) -> AccessResult<Vec<u8>> {
        self.check_sequential(Permission::Read, len as u64)?;
        let bytes = self.backing.read_bytes(self.cursor, len)?;
        self.advance(len as u64);
        Ok(bytes)
    }

    /// Writes `data` at the cursor and advances past it.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write_bytes(&mut self, data: &[u8]) -> AccessResult<()> {
        self.check_sequential(Permission::Write, data.len() as u64)?;
        self.backing.write_bytes(self.cursor, data)?;
        self.advance(data.len() as u64);
        Ok(())
    }

    /// Reads `len` bytes starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_bytes(&mut self, index: u64, len: usize) -> AccessResult<Vec<u8>> {
        self.check_at(Permission::Read, "get_bytes", index, len as u64)?;
        Ok(self.backing.backend().get_bytes(index, len)?)
    }

    /// Writes `data` starting at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set_bytes(&mut self, index: u64, data: &[u8]) -> AccessResult<()> {
        self.check_at(Permission::Write, "set_bytes", index, data.len() as u64)?;
        Ok(self.backing.backend().set_bytes(index, data)?)
    }
}

macro_rules! typed_accessors {
    ($($ty:ty => $read:ident, $write:ident, $get:ident, $set:ident;)*) => {
        impl Access {
            $(
                #[doc = concat!("Reads a `", stringify!($ty), "` at the cursor and advances past it.")]
                ///
                /// # Errors
                ///
                /// Returns an error if a check fails or the backend cannot read.
                #[inline]
                pub fn $read(&mut self) -> AccessResult<$ty> {
                    self.read_value::<$ty>()
                }

                #[doc = concat!("Writes a `", stringify!($ty), "` at the cursor and advances past it.")]
                ///
                /// # Errors
                ///
                /// Returns an error if a check fails or the backend cannot write.
                #[inline]
                pub fn $write(&mut self, value: $ty) -> AccessResult<()> {
                    self.write_value(value)
                }

                #[doc = concat!("Reads a `", stringify!($ty), "` at `index`.")]
                ///
                /// # Errors
                ///
                /// Returns an error if a check fails or the backend cannot read.
                #[inline]
                pub fn $get(&mut self, index: u64) -> AccessResult<$ty> {
                    self.get_value::<$ty>(index)
                }

                #[doc = concat!("Writes a `", stringify!($ty), "` at `index`.")]
                ///
                /// # Errors
                ///
                /// Returns an error if a check fails or the backend cannot write.
                #[inline]
                pub fn $set(&mut self, index: u64, value: $ty) -> AccessResult<()> {
                    self.set_value(index, value)
                }
            )*
        }
    };
}

typed_accessors! {
    i8 => read_i8, write_i8, get_i8, set_i8;
    u8 => read_u8, write_u8, get_u8, set_u8;
    i16 => read_i16, write_i16, get_i16, set_i16;
    u16 => read_u16, write_u16, get_u16, set_u16;
    i32 => read_i32, write_i32, get_i32, set_i32;
    u32 => read_u32, write_u32, get_u32, set_u32;
    i64 => read_i64, write_i64, get_i64, set_i64;
    u64 => read_u64, write_u64, get_u64, set_u64;
    f32 => read_f32, write_f32, get_f32, set_f32;
    f64 => read_f64, write_f64, get_f64, set_f64;
    bool => read_bool, write_bool, get_bool, set_bool;
}

/// 16-bit character accessors. A character is a single UTF-16 code unit
/// stored as a `u16` under the access byte order; surrogate pairs are two
/// units.
impl Access {
    /// Reads a UTF-16 code unit at the cursor and advances past it.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn read_char_unit(&mut self) -> AccessResult<u16> {
        self.read_u16()
    }

    /// Writes a UTF-16 code unit at the cursor and advances past it.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn write_char_unit(&mut self, unit: u16) -> AccessResult<()> {
        self.write_u16(unit)
    }

    /// Reads a UTF-16 code unit at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot read.
    pub fn get_char_unit(&mut self, index: u64) -> AccessResult<u16> {
        self.get_u16(index)
    }

    /// Writes a UTF-16 code unit at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if a check fails or the backend cannot write.
    pub fn set_char_unit(&mut self, index: u64, unit: u16) -> AccessResult<()> {
        self.set_u16(index, unit)
    }
}
