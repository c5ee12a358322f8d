//! Fixed-width primitive encoding.

use crate::error::{CodecError, CodecResult};
use crate::order::ByteOrder;
use std::fmt;

/// A fixed-width value with a byte-order dependent encoding.
///
/// Implemented for the signed and unsigned 8/16/32/64-bit integers, the
/// IEEE-754 floats and `bool`. Conversions never validate ranges: the bytes
/// are the value's bit pattern in the requested order.
pub trait Primitive: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The encoded representation, always `[u8; WIDTH]`.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default + Copy;

    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Encodes the value in the given byte order.
    fn to_bytes(self, order: ByteOrder) -> Self::Bytes;

    /// Decodes a value from its encoded representation.
    fn from_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty => $width:literal),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Bytes = [u8; $width];
                const WIDTH: usize = $width;

                #[inline]
                fn to_bytes(self, order: ByteOrder) -> Self::Bytes {
                    match order {
                        ByteOrder::BigEndian => self.to_be_bytes(),
                        ByteOrder::LittleEndian => self.to_le_bytes(),
                    }
                }

                #[inline]
                fn from_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self {
                    match order {
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(bytes),
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(bytes),
                    }
                }
            }
        )*
    };
}

impl_primitive! {
    i8 => 1,
    u8 => 1,
    i16 => 2,
    u16 => 2,
    i32 => 4,
    u32 => 4,
    i64 => 8,
    u64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Booleans are a single byte: `1` for true, `0` for false.
/// Any non-zero byte decodes as true.
impl Primitive for bool {
    type Bytes = [u8; 1];
    const WIDTH: usize = 1;

    #[inline]
    fn to_bytes(self, _order: ByteOrder) -> Self::Bytes {
        [u8::from(self)]
    }

    #[inline]
    fn from_bytes(bytes: Self::Bytes, _order: ByteOrder) -> Self {
        bytes[0] != 0
    }
}

/// Encodes a value into a fixed-size array.
#[inline]
pub fn encode<T: Primitive>(value: T, order: ByteOrder) -> T::Bytes {
    value.to_bytes(order)
}

/// Encodes a value into the front of `out`.
///
/// # Errors
///
/// Returns [`CodecError::ShortOutput`] if `out` is shorter than `T::WIDTH`.
pub fn encode_into<T: Primitive>(value: T, order: ByteOrder, out: &mut [u8]) -> CodecResult<()> {
    if out.len() < T::WIDTH {
        return Err(CodecError::short_output(T::WIDTH, out.len()));
    }
    out[..T::WIDTH].copy_from_slice(value.to_bytes(order).as_ref());
    Ok(())
}

/// Decodes a value from the front of `bytes`.
///
/// # Errors
///
/// Returns [`CodecError::ShortInput`] if `bytes` is shorter than `T::WIDTH`.
pub fn decode<T: Primitive>(bytes: &[u8], order: ByteOrder) -> CodecResult<T> {
    if bytes.len() < T::WIDTH {
        return Err(CodecError::short_input(T::WIDTH, bytes.len()));
    }
    let mut raw = T::Bytes::default();
    raw.as_mut().copy_from_slice(&bytes[..T::WIDTH]);
    Ok(T::from_bytes(raw, order))
}
