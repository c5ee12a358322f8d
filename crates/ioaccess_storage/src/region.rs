//! Pointer-level helpers shared by the native memory backends.
//!
//! Every function here is `unsafe`: the caller guarantees that the pointer
//! is valid for the accessed span and that the memory stays alive for the
//! duration of the call.

use ioaccess_codec::{ByteOrder, Primitive};
use std::ptr;

/// Decodes a `T` from the `T::WIDTH` bytes at `src`.
///
/// # Safety
///
/// `src` must be valid for reads of `T::WIDTH` bytes.
#[inline]
pub(crate) unsafe fn read_value<T: Primitive>(src: *const u8, order: ByteOrder) -> T {
    let mut bytes = T::Bytes::default();
    // SAFETY: caller guarantees src is readable for WIDTH bytes; bytes is a
    // local array of exactly WIDTH bytes.
    unsafe { ptr::copy_nonoverlapping(src, bytes.as_mut().as_mut_ptr(), T::WIDTH) };
    T::from_bytes(bytes, order)
}

/// Encodes `value` into the `T::WIDTH` bytes at `dst`.
///
/// # Safety
///
/// `dst` must be valid for writes of `T::WIDTH` bytes.
#[inline]
pub(crate) unsafe fn write_value<T: Primitive>(dst: *mut u8, value: T, order: ByteOrder) {
    let bytes = value.to_bytes(order);
    // SAFETY: caller guarantees dst is writable for WIDTH bytes.
    unsafe { ptr::copy_nonoverlapping(bytes.as_ref().as_ptr(), dst, T::WIDTH) };
}

/// Copies `len` bytes at `src` into a new vector.
///
/// # Safety
///
/// `src` must be valid for reads of `len` bytes.
pub(crate) unsafe fn read_into(src: *const u8, len: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    // SAFETY: buffer holds len bytes; caller guarantees src does too.
    unsafe { ptr::copy_nonoverlapping(src, buffer.as_mut_ptr(), len) };
    buffer
}

/// Copies `data` to `dst`.
///
/// # Safety
///
/// `dst` must be valid for writes of `data.len()` bytes and must not overlap
/// `data`.
pub(crate) unsafe fn write_from(dst: *mut u8, data: &[u8]) {
    // SAFETY: upheld by the caller.
    unsafe { ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len()) };
}

/// Sets `len` bytes at `dst` to `byte`.
///
/// # Safety
///
/// `dst` must be valid for writes of `len` bytes.
pub(crate) unsafe fn fill(dst: *mut u8, len: usize, byte: u8) {
    // SAFETY: upheld by the caller.
    unsafe { ptr::write_bytes(dst, byte, len) };
}

/// Copies `len` bytes from `src` to `dst`. The spans may overlap.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` for writes of `len` bytes.
pub(crate) unsafe fn copy(src: *const u8, dst: *mut u8, len: usize) {
    // SAFETY: upheld by the caller; ptr::copy tolerates overlap.
    unsafe { ptr::copy(src, dst, len) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_roundtrip_through_pointer() {
        let mut buffer = [0u8; 8];
        unsafe {
            write_value(buffer.as_mut_ptr().add(2), 0x1122_3344u32, ByteOrder::BigEndian);
            assert_eq!(read_value::<u32>(buffer.as_ptr().add(2), ByteOrder::BigEndian), 0x1122_3344);
        }
        assert_eq!(buffer, [0, 0, 0x11, 0x22, 0x33, 0x44, 0, 0]);
    }

    #[test]
    fn overlapping_copy_is_memmove() {
        let mut buffer = *b"abcdef";
        let base = buffer.as_mut_ptr();
        unsafe { copy(base, base.add(2), 4) };
        assert_eq!(&buffer, b"ababcd");
    }

    #[test]
    fn fill_and_read_back() {
        let mut buffer = [0u8; 4];
        unsafe {
            fill(buffer.as_mut_ptr().add(1), 2, 0xAA);
            write_from(buffer.as_mut_ptr(), &[7]);
            assert_eq!(read_into(buffer.as_ptr(), 4), vec![7, 0xAA, 0xAA, 0]);
        }
    }
}
