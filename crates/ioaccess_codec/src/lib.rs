//! # ioaccess Codec
//!
//! Byte-order aware encoding of primitive values and text for ioaccess.
//!
//! This crate is the single place where numbers become bytes:
//! - Signed and unsigned 8/16/32/64-bit integers
//! - IEEE-754 32/64-bit floats (raw bit patterns, NaN payloads preserved)
//! - Booleans as a single `0`/`1` byte
//! - Text in UTF-8, UTF-16 (BE/LE), ISO-8859-1 and ASCII
//!
//! It is pure and stateless. Bounds, permissions and ownership belong to the
//! layers above.
//!
//! ## Usage
//!
//! ```
//! use ioaccess_codec::{decode, encode, ByteOrder};
//!
//! let bytes = encode(0x1122_3344i32, ByteOrder::BigEndian);
//! assert_eq!(bytes, [0x11, 0x22, 0x33, 0x44]);
//!
//! let value: i32 = decode(&bytes, ByteOrder::BigEndian).unwrap();
//! assert_eq!(value, 0x1122_3344);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod order;
mod primitive;
mod text;

pub use error::{CodecError, CodecResult};
pub use order::ByteOrder;
pub use primitive::{decode, encode, encode_into, Primitive};
pub use text::{decode_text, encode_text, TextEncoding};
