//! Property-based test generators using proptest.
//!
//! Provides strategies for generating typed values, byte orders, text and
//! byte payloads.

use ioaccess_codec::encode;
use ioaccess_core::{Access, AccessResult, ByteOrder, TextEncoding};
use proptest::prelude::*;

/// One value of any primitive type an access can read and write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedValue {
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// Boolean stored as one byte.
    Bool(bool),
}

impl TypedValue {
    /// Encoded width in bytes.
    pub fn width(&self) -> usize {
        match self {
            Self::I8(_) | Self::U8(_) | Self::Bool(_) => 1,
            Self::I16(_) | Self::U16(_) => 2,
            Self::I32(_) | Self::U32(_) | Self::F32(_) => 4,
            Self::I64(_) | Self::U64(_) | Self::F64(_) => 8,
        }
    }

    /// Encodes the value under `order`.
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        match *self {
            Self::I8(v) => encode(v, order).to_vec(),
            Self::U8(v) => encode(v, order).to_vec(),
            Self::I16(v) => encode(v, order).to_vec(),
            Self::U16(v) => encode(v, order).to_vec(),
            Self::I32(v) => encode(v, order).to_vec(),
            Self::U32(v) => encode(v, order).to_vec(),
            Self::I64(v) => encode(v, order).to_vec(),
            Self::U64(v) => encode(v, order).to_vec(),
            Self::F32(v) => encode(v, order).to_vec(),
            Self::F64(v) => encode(v, order).to_vec(),
            Self::Bool(v) => encode(v, order).to_vec(),
        }
    }

    /// Writes the value at the cursor.
    pub fn write_to(&self, access: &mut Access) -> AccessResult<()> {
        match *self {
            Self::I8(v) => access.write_i8(v),
            Self::U8(v) => access.write_u8(v),
            Self::I16(v) => access.write_i16(v),
            Self::U16(v) => access.write_u16(v),
            Self::I32(v) => access.write_i32(v),
            Self::U32(v) => access.write_u32(v),
            Self::I64(v) => access.write_i64(v),
            Self::U64(v) => access.write_u64(v),
            Self::F32(v) => access.write_f32(v),
            Self::F64(v) => access.write_f64(v),
            Self::Bool(v) => access.write_bool(v),
        }
    }

    /// Reads a value of the same type at the cursor.
    pub fn read_like(&self, access: &mut Access) -> AccessResult<Self> {
        Ok(match self {
            Self::I8(_) => Self::I8(access.read_i8()?),
            Self::U8(_) => Self::U8(access.read_u8()?),
            Self::I16(_) => Self::I16(access.read_i16()?),
            Self::U16(_) => Self::U16(access.read_u16()?),
            Self::I32(_) => Self::I32(access.read_i32()?),
            Self::U32(_) => Self::U32(access.read_u32()?),
            Self::I64(_) => Self::I64(access.read_i64()?),
            Self::U64(_) => Self::U64(access.read_u64()?),
            Self::F32(_) => Self::F32(access.read_f32()?),
            Self::F64(_) => Self::F64(access.read_f64()?),
            Self::Bool(_) => Self::Bool(access.read_bool()?),
        })
    }

    /// Writes the value at `index`.
    pub fn set_at(&self, access: &mut Access, index: u64) -> AccessResult<()> {
        match *self {
            Self::I8(v) => access.set_i8(index, v),
            Self::U8(v) => access.set_u8(index, v),
            Self::I16(v) => access.set_i16(index, v),
            Self::U16(v) => access.set_u16(index, v),
            Self::I32(v) => access.set_i32(index, v),
            Self::U32(v) => access.set_u32(index, v),
            Self::I64(v) => access.set_i64(index, v),
            Self::U64(v) => access.set_u64(index, v),
            Self::F32(v) => access.set_f32(index, v),
            Self::F64(v) => access.set_f64(index, v),
            Self::Bool(v) => access.set_bool(index, v),
        }
    }

    /// Reads a value of the same type at `index`.
    pub fn get_like(&self, access: &mut Access, index: u64) -> AccessResult<Self> {
        Ok(match self {
            Self::I8(_) => Self::I8(access.get_i8(index)?),
            Self::U8(_) => Self::U8(access.get_u8(index)?),
            Self::I16(_) => Self::I16(access.get_i16(index)?),
            Self::U16(_) => Self::U16(access.get_u16(index)?),
            Self::I32(_) => Self::I32(access.get_i32(index)?),
            Self::U32(_) => Self::U32(access.get_u32(index)?),
            Self::I64(_) => Self::I64(access.get_i64(index)?),
            Self::U64(_) => Self::U64(access.get_u64(index)?),
            Self::F32(_) => Self::F32(access.get_f32(index)?),
            Self::F64(_) => Self::F64(access.get_f64(index)?),
            Self::Bool(_) => Self::Bool(access.get_bool(index)?),
        })
    }

    /// Compares by bit pattern, so NaN payloads compare equal to themselves.
    pub fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// Strategy for either byte order.
pub fn byte_order_strategy() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::BigEndian), Just(ByteOrder::LittleEndian)]
}

/// Strategy for any typed value, floats included with arbitrary bit patterns.
pub fn typed_value_strategy() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        any::<i8>().prop_map(TypedValue::I8),
        any::<u8>().prop_map(TypedValue::U8),
        any::<i16>().prop_map(TypedValue::I16),
        any::<u16>().prop_map(TypedValue::U16),
        any::<i32>().prop_map(TypedValue::I32),
        any::<u32>().prop_map(TypedValue::U32),
        any::<i64>().prop_map(TypedValue::I64),
        any::<u64>().prop_map(TypedValue::U64),
        any::<u32>().prop_map(|bits| TypedValue::F32(f32::from_bits(bits))),
        any::<u64>().prop_map(|bits| TypedValue::F64(f64::from_bits(bits))),
        any::<bool>().prop_map(TypedValue::Bool),
    ]
}

/// Strategy for a sequence of typed values.
pub fn typed_values_strategy(max: usize) -> impl Strategy<Value = Vec<TypedValue>> {
    prop::collection::vec(typed_value_strategy(), 0..max)
}

/// Strategy for boundary integers: 0, -1, min and max of each width.
pub fn boundary_value_strategy() -> impl Strategy<Value = TypedValue> {
    prop::sample::select(vec![
        TypedValue::I8(0),
        TypedValue::I8(-1),
        TypedValue::I8(i8::MIN),
        TypedValue::I8(i8::MAX),
        TypedValue::U8(u8::MAX),
        TypedValue::I16(-1),
        TypedValue::I16(i16::MIN),
        TypedValue::I16(i16::MAX),
        TypedValue::U16(u16::MAX),
        TypedValue::I32(-1),
        TypedValue::I32(i32::MIN),
        TypedValue::I32(i32::MAX),
        TypedValue::U32(u32::MAX),
        TypedValue::I64(-1),
        TypedValue::I64(i64::MIN),
        TypedValue::I64(i64::MAX),
        TypedValue::U64(u64::MAX),
        TypedValue::F32(f32::MIN),
        TypedValue::F32(f32::INFINITY),
        TypedValue::F64(f64::MAX),
        TypedValue::F64(f64::NEG_INFINITY),
    ])
}

/// Strategy for text encodings.
pub fn text_encoding_strategy() -> impl Strategy<Value = TextEncoding> {
    prop_oneof![
        Just(TextEncoding::Utf8),
        Just(TextEncoding::Utf16Be),
        Just(TextEncoding::Utf16Le),
    ]
}

/// Strategy for text that every Unicode encoding round-trips.
pub fn text_strategy(max_chars: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..max_chars).prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for printable ASCII text.
pub fn ascii_text_strategy(max_chars: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[ -~]{{0,{max_chars}}}")).expect("Invalid regex")
}

/// Strategy for arbitrary byte payloads.
pub fn bytes_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn typed_values_roundtrip_on_heap(values in typed_values_strategy(32), order in byte_order_strategy()) {
            let size: usize = values.iter().map(TypedValue::width).sum();
            let mut access = Access::allocate(size);
            access.set_byte_order(order).unwrap();

            for value in &values {
                value.write_to(&mut access).unwrap();
            }
            access.flip().unwrap();
            for value in &values {
                let read = value.read_like(&mut access).unwrap();
                prop_assert!(value.same_bits(&read));
            }
            prop_assert_eq!(access.remaining(), Some(0));
        }

        #[test]
        fn ascii_text_is_ascii(text in ascii_text_strategy(40)) {
            prop_assert!(text.is_ascii());
            prop_assert!(text.len() <= 40);
        }
    }

    #[test]
    fn widths() {
        assert_eq!(TypedValue::Bool(true).width(), 1);
        assert_eq!(TypedValue::U16(0).width(), 2);
        assert_eq!(TypedValue::F32(0.0).width(), 4);
        assert_eq!(TypedValue::I64(0).width(), 8);
    }
}
