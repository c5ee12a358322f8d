//! Fuzz testing harnesses for ioaccess.
//!
//! Operation sequences run against an [`Access`] and against a plain
//! `Vec<u8>` model side by side. Any difference in outcome, cursor or
//! contents is a bug in the access layer. The byte-slice entry points can
//! be driven by cargo-fuzz or any other fuzzer.

use crate::generators::{typed_value_strategy, TypedValue};
use ioaccess_core::{Access, ByteOrder};
use proptest::prelude::*;

/// One operation on an access.
#[derive(Debug, Clone)]
pub enum AccessOp {
    /// Sequential typed write.
    Write(TypedValue),
    /// Sequential typed read of the given type.
    Read(TypedValue),
    /// Indexed typed write.
    Set(u64, TypedValue),
    /// Indexed typed read of the given type.
    Get(u64, TypedValue),
    /// Sequential bulk write.
    WriteBytes(Vec<u8>),
    /// Move the cursor.
    SetIndex(u64),
    /// Skip input bytes.
    Skip(u64),
    /// Fill the remainder.
    Fill(u8),
    /// Zero everything.
    Clear,
    /// Reset the cursor.
    Flip,
}

impl AccessOp {
    /// Parses operations from fuzzer input. Trailing bytes that do not form
    /// a full operation are ignored.
    pub fn parse_sequence(data: &[u8]) -> Vec<AccessOp> {
        let mut ops = Vec::new();
        let mut input = data;

        while let Some((&tag, rest)) = input.split_first() {
            input = rest;
            let op = match tag % 10 {
                0 | 1 | 2 | 3 => {
                    let Some((value, rest)) = parse_value(input) else { break };
                    input = rest;
                    match tag % 10 {
                        0 => AccessOp::Write(value),
                        1 => AccessOp::Read(value),
                        2 | 3 => {
                            let Some((&index, rest)) = input.split_first() else { break };
                            input = rest;
                            if tag % 10 == 2 {
                                AccessOp::Set(u64::from(index), value)
                            } else {
                                AccessOp::Get(u64::from(index), value)
                            }
                        }
                        _ => unreachable!(),
                    }
                }
                4 => {
                    let Some((&len, rest)) = input.split_first() else { break };
                    let len = usize::from(len % 32).min(rest.len());
                    input = &rest[len..];
                    AccessOp::WriteBytes(rest[..len].to_vec())
                }
                5 | 6 => {
                    let Some((&n, rest)) = input.split_first() else { break };
                    input = rest;
                    if tag % 10 == 5 {
                        AccessOp::SetIndex(u64::from(n))
                    } else {
                        AccessOp::Skip(u64::from(n))
                    }
                }
                7 => {
                    let Some((&byte, rest)) = input.split_first() else { break };
                    input = rest;
                    AccessOp::Fill(byte)
                }
                8 => AccessOp::Clear,
                _ => AccessOp::Flip,
            };
            ops.push(op);
        }

        ops
    }
}

fn parse_value(input: &[u8]) -> Option<(TypedValue, &[u8])> {
    let (&tag, rest) = input.split_first()?;
    let width = match tag % 11 {
        0 | 1 | 10 => 1,
        2 | 3 => 2,
        4 | 5 | 8 => 4,
        _ => 8,
    };
    if rest.len() < width {
        return None;
    }
    let mut raw = [0u8; 8];
    raw[..width].copy_from_slice(&rest[..width]);
    let bits = u64::from_le_bytes(raw);

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let value = match tag % 11 {
        0 => TypedValue::I8(bits as i8),
        1 => TypedValue::U8(bits as u8),
        2 => TypedValue::I16(bits as i16),
        3 => TypedValue::U16(bits as u16),
        4 => TypedValue::I32(bits as i32),
        5 => TypedValue::U32(bits as u32),
        6 => TypedValue::I64(bits as i64),
        7 => TypedValue::U64(bits),
        8 => TypedValue::F32(f32::from_bits(bits as u32)),
        9 => TypedValue::F64(f64::from_bits(bits)),
        _ => TypedValue::Bool(bits & 1 == 1),
    };
    Some((value, &rest[width..]))
}

/// Strategy for a single access operation over an access of `size` bytes.
pub fn access_op_strategy(size: u64) -> impl Strategy<Value = AccessOp> {
    let index = 0..size + 8;
    prop_oneof![
        4 => typed_value_strategy().prop_map(AccessOp::Write),
        3 => typed_value_strategy().prop_map(AccessOp::Read),
        3 => (index.clone(), typed_value_strategy()).prop_map(|(i, v)| AccessOp::Set(i, v)),
        3 => (index.clone(), typed_value_strategy()).prop_map(|(i, v)| AccessOp::Get(i, v)),
        2 => prop::collection::vec(any::<u8>(), 0..16).prop_map(AccessOp::WriteBytes),
        2 => index.clone().prop_map(AccessOp::SetIndex),
        1 => (0..16u64).prop_map(AccessOp::Skip),
        1 => any::<u8>().prop_map(AccessOp::Fill),
        1 => Just(AccessOp::Clear),
        1 => Just(AccessOp::Flip),
    ]
}

/// Strategy for a sequence of access operations.
pub fn access_ops_strategy(size: u64, max: usize) -> impl Strategy<Value = Vec<AccessOp>> {
    prop::collection::vec(access_op_strategy(size), 0..max)
}

/// Reference model of a bounded, indexed, read-write access.
#[derive(Debug, Clone)]
pub struct AccessModel {
    /// Expected contents.
    pub data: Vec<u8>,
    /// Expected cursor.
    pub cursor: u64,
    /// Byte order in effect.
    pub order: ByteOrder,
}

impl AccessModel {
    /// Creates a zeroed model of `size` bytes.
    pub fn new(size: usize, order: ByteOrder) -> Self {
        Self {
            data: vec![0; size],
            cursor: 0,
            order,
        }
    }

    fn span(&self, position: u64, len: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(position).ok()?;
        let end = start.checked_add(len)?;
        (end <= self.data.len()).then_some(start..end)
    }

    /// Applies `op`. Returns `None` if the op must fail, otherwise the bytes
    /// it read (empty for writes).
    pub fn apply(&mut self, op: &AccessOp) -> Option<Vec<u8>> {
        match op {
            AccessOp::Write(value) => {
                let bytes = value.to_bytes(self.order);
                let range = self.span(self.cursor, bytes.len())?;
                self.data[range].copy_from_slice(&bytes);
                self.cursor += bytes.len() as u64;
                Some(Vec::new())
            }
            AccessOp::Read(value) => {
                let range = self.span(self.cursor, value.width())?;
                self.cursor += value.width() as u64;
                Some(normalize(value, &self.data[range]))
            }
            AccessOp::Set(index, value) => {
                let bytes = value.to_bytes(self.order);
                let range = self.span(*index, bytes.len())?;
                self.data[range].copy_from_slice(&bytes);
                Some(Vec::new())
            }
            AccessOp::Get(index, value) => {
                let range = self.span(*index, value.width())?;
                Some(normalize(value, &self.data[range]))
            }
            AccessOp::WriteBytes(bytes) => {
                let range = self.span(self.cursor, bytes.len())?;
                self.data[range].copy_from_slice(bytes);
                self.cursor += bytes.len() as u64;
                Some(Vec::new())
            }
            AccessOp::SetIndex(pos) => {
                self.span(*pos, 0)?;
                self.cursor = *pos;
                Some(Vec::new())
            }
            AccessOp::Skip(n) => {
                self.span(self.cursor, usize::try_from(*n).ok()?)?;
                self.cursor += n;
                Some(Vec::new())
            }
            AccessOp::Fill(byte) => {
                let start = usize::try_from(self.cursor).ok()?;
                self.data[start..].fill(*byte);
                self.cursor = self.data.len() as u64;
                Some(Vec::new())
            }
            AccessOp::Clear => {
                self.data.fill(0);
                self.cursor = 0;
                Some(Vec::new())
            }
            AccessOp::Flip => {
                self.cursor = 0;
                Some(Vec::new())
            }
        }
    }
}

/// Booleans read back as 0 or 1 whatever byte is stored.
fn normalize(value: &TypedValue, bytes: &[u8]) -> Vec<u8> {
    match value {
        TypedValue::Bool(_) => vec![u8::from(bytes[0] != 0)],
        _ => bytes.to_vec(),
    }
}

/// Applies `op` to a real access, returning the bytes it read in the same
/// shape as [`AccessModel::apply`].
pub fn apply_to_access(access: &mut Access, op: &AccessOp) -> Option<Vec<u8>> {
    let order = access.byte_order();
    let result = match op {
        AccessOp::Write(value) => value.write_to(access).map(|()| Vec::new()),
        AccessOp::Read(value) => value.read_like(access).map(|read| read.to_bytes(order)),
        AccessOp::Set(index, value) => value.set_at(access, *index).map(|()| Vec::new()),
        AccessOp::Get(index, value) => value.get_like(access, *index).map(|read| read.to_bytes(order)),
        AccessOp::WriteBytes(bytes) => access.write_bytes(bytes).map(|()| Vec::new()),
        AccessOp::SetIndex(pos) => access.set_index(*pos).map(|()| Vec::new()),
        AccessOp::Skip(n) => access.skip(*n).map(|()| Vec::new()),
        AccessOp::Fill(byte) => access.fill(*byte).map(|()| Vec::new()),
        AccessOp::Clear => access.clear().map(|()| Vec::new()),
        AccessOp::Flip => access.flip().map(|()| Vec::new()),
    };
    result.ok()
}

/// Runs `ops` against `access` and a fresh model of the same size.
///
/// The access must be bounded, indexed, read-write and zeroed.
///
/// # Errors
///
/// Returns a description of the first divergence.
pub fn check_against_model(access: &mut Access, ops: &[AccessOp]) -> Result<(), String> {
    let size = access
        .length()
        .ok_or_else(|| "model checking needs a bounded access".to_string())?;
    let size = usize::try_from(size).map_err(|e| e.to_string())?;
    let mut model = AccessModel::new(size, access.byte_order());

    for (step, op) in ops.iter().enumerate() {
        let expected = model.apply(op);
        let actual = apply_to_access(access, op);
        if expected != actual {
            return Err(format!("step {step} {op:?}: model {expected:?}, access {actual:?}"));
        }
        if model.cursor != access.index() {
            return Err(format!("step {step} {op:?}: model cursor {}, access cursor {}", model.cursor, access.index()));
        }
    }

    let contents = access.get_bytes(0, size).map_err(|e| e.to_string())?;
    if contents != model.data {
        return Err(format!("final contents differ: model {:?}, access {contents:?}", model.data));
    }
    Ok(())
}

/// Fuzz target: runs an operation sequence parsed from `data` against each
/// in-memory kind and panics on any divergence from the model.
pub fn fuzz_access_operations(data: &[u8]) {
    let Some((&order, rest)) = data.split_first() else { return };
    let order = if order & 1 == 0 {
        ByteOrder::BigEndian
    } else {
        ByteOrder::LittleEndian
    };
    let ops = AccessOp::parse_sequence(rest);

    let accesses = [
        Some(Access::allocate(64)),
        Access::scoped_memory(64).ok(),
        Access::raw(64).ok(),
    ];
    for mut access in accesses.into_iter().flatten() {
        if access.set_byte_order(order).is_err() {
            return;
        }
        if let Err(divergence) = check_against_model(&mut access, &ops) {
            panic!("{} backend diverged: {divergence}", access.backend_kind());
        }
    }
}

/// Fuzz target: arbitrary bytes as strings must decode without panicking
/// under every encoding, and prefixed reads must stay within bounds.
pub fn fuzz_string_decode(data: &[u8]) {
    use ioaccess_core::TextEncoding;

    let mut access = Access::from_bytes(data.to_vec());
    for encoding in [
        TextEncoding::Utf8,
        TextEncoding::Utf16Be,
        TextEncoding::Utf16Le,
        TextEncoding::Latin1,
        TextEncoding::Ascii,
    ] {
        let _ = access.get_string(0, data.len(), encoding);
        let _ = access.get_string_byte(0, encoding);
        let _ = access.get_string_short(0, encoding);
    }
}
