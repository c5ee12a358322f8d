//! Text encodings for string payloads.
//!
//! Encoding never fails: characters the target encoding cannot represent are
//! written as `?`. Decoding never fails either: malformed input decodes to
//! U+FFFD. Length limits for prefixed strings are enforced by the caller on
//! the encoded byte length.

use std::fmt;

/// Character encodings supported for string payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    /// UTF-8.
    #[default]
    Utf8,
    /// UTF-16, big-endian code units, no byte order mark.
    Utf16Be,
    /// UTF-16, little-endian code units, no byte order mark.
    Utf16Le,
    /// ISO-8859-1.
    Latin1,
    /// 7-bit US-ASCII.
    Ascii,
}

const REPLACEMENT_BYTE: u8 = b'?';

impl TextEncoding {
    /// Encodes `text` into bytes.
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Latin1 => text.chars().map(|c| narrow(c, 0xff)).collect(),
            Self::Ascii => text.chars().map(|c| narrow(c, 0x7f)).collect(),
        }
    }

    /// Decodes `bytes` into a string.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        }
    }

    /// Returns the canonical name of the encoding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn narrow(c: char, max: u32) -> u8 {
    let code = u32::from(c);
    if code <= max {
        code as u8
    } else {
        REPLACEMENT_BYTE
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    // odd trailing byte
    if bytes.len() % 2 == 1 {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

/// Encodes `text` with `encoding`.
#[must_use]
pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    encoding.encode(text)
}

/// Decodes `bytes` with `encoding`.
#[must_use]
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    encoding.decode(bytes)
}
