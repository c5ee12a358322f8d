//! Known-answer vectors for the binary codec.
//!
//! Each vector pins the exact bytes a value encodes to under one byte
//! order. Other implementations of the same layout can be checked against
//! the same table.

use crate::generators::TypedValue;
use ioaccess_core::{ByteOrder, TextEncoding};

/// A typed value and its expected encoding.
#[derive(Debug, Clone)]
pub struct CodecVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// The value to encode.
    pub value: TypedValue,
    /// Byte order used for encoding.
    pub order: ByteOrder,
    /// Expected bytes (hex-encoded).
    pub expected_hex: &'static str,
}

impl CodecVector {
    /// Decodes the expected bytes.
    pub fn expected(&self) -> Vec<u8> {
        from_hex(self.expected_hex)
    }
}

/// A string and its expected encoding.
#[derive(Debug, Clone)]
pub struct TextVector {
    /// Unique identifier for this vector.
    pub id: &'static str,
    /// The text to encode.
    pub text: &'static str,
    /// Encoding under test.
    pub encoding: TextEncoding,
    /// Expected bytes (hex-encoded).
    pub expected_hex: &'static str,
}

impl TextVector {
    /// Decodes the expected bytes.
    pub fn expected(&self) -> Vec<u8> {
        from_hex(self.expected_hex)
    }
}

/// Decodes a hex string. Panics on malformed input.
pub fn from_hex(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0, "odd hex length");
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("invalid hex digit"))
        .collect()
}

/// Encodes bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Integer and float encoding vectors.
pub fn codec_vectors() -> Vec<CodecVector> {
    use ByteOrder::{BigEndian as BE, LittleEndian as LE};
    use TypedValue as V;

    vec![
        CodecVector { id: "i8_neg1", value: V::I8(-1), order: BE, expected_hex: "ff" },
        CodecVector { id: "u8_max", value: V::U8(u8::MAX), order: LE, expected_hex: "ff" },
        CodecVector { id: "bool_true", value: V::Bool(true), order: BE, expected_hex: "01" },
        CodecVector { id: "bool_false", value: V::Bool(false), order: LE, expected_hex: "00" },
        CodecVector { id: "i16_be", value: V::I16(0x1234), order: BE, expected_hex: "1234" },
        CodecVector { id: "i16_le", value: V::I16(0x1234), order: LE, expected_hex: "3412" },
        CodecVector { id: "i16_min_be", value: V::I16(i16::MIN), order: BE, expected_hex: "8000" },
        CodecVector { id: "u16_max_le", value: V::U16(u16::MAX), order: LE, expected_hex: "ffff" },
        CodecVector { id: "i32_be", value: V::I32(0x1122_3344), order: BE, expected_hex: "11223344" },
        CodecVector { id: "i32_le", value: V::I32(0x1122_3344), order: LE, expected_hex: "44332211" },
        CodecVector { id: "i32_neg1", value: V::I32(-1), order: LE, expected_hex: "ffffffff" },
        CodecVector { id: "u32_be", value: V::U32(0xDEAD_BEEF), order: BE, expected_hex: "deadbeef" },
        CodecVector {
            id: "i64_be",
            value: V::I64(0x0102_0304_0506_0708),
            order: BE,
            expected_hex: "0102030405060708",
        },
        CodecVector {
            id: "i64_le",
            value: V::I64(0x0102_0304_0506_0708),
            order: LE,
            expected_hex: "0807060504030201",
        },
        CodecVector { id: "i64_min_be", value: V::I64(i64::MIN), order: BE, expected_hex: "8000000000000000" },
        CodecVector { id: "u64_max", value: V::U64(u64::MAX), order: LE, expected_hex: "ffffffffffffffff" },
        CodecVector { id: "f32_one_be", value: V::F32(1.0), order: BE, expected_hex: "3f800000" },
        CodecVector { id: "f32_neg2_le", value: V::F32(-2.0), order: LE, expected_hex: "000000c0" },
        CodecVector { id: "f64_one_be", value: V::F64(1.0), order: BE, expected_hex: "3ff0000000000000" },
        CodecVector { id: "f64_half_le", value: V::F64(0.5), order: LE, expected_hex: "000000000000e03f" },
    ]
}

/// Text encoding vectors.
pub fn text_vectors() -> Vec<TextVector> {
    vec![
        TextVector { id: "utf8_ascii", text: "abc", encoding: TextEncoding::Utf8, expected_hex: "616263" },
        TextVector { id: "utf8_two_byte", text: "é", encoding: TextEncoding::Utf8, expected_hex: "c3a9" },
        TextVector { id: "utf16be", text: "hi", encoding: TextEncoding::Utf16Be, expected_hex: "00680069" },
        TextVector { id: "utf16le", text: "hi", encoding: TextEncoding::Utf16Le, expected_hex: "68006900" },
        TextVector {
            id: "utf16be_surrogate",
            text: "\u{1F600}",
            encoding: TextEncoding::Utf16Be,
            expected_hex: "d83dde00",
        },
        TextVector { id: "latin1", text: "ÿ", encoding: TextEncoding::Latin1, expected_hex: "ff" },
        TextVector { id: "empty", text: "", encoding: TextEncoding::Utf8, expected_hex: "" },
    ]
}
