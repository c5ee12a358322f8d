//! Byte order selection.

use std::fmt;

/// The byte order used for multi-byte values.
///
/// Only typed values are affected. Raw byte copies are never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first.
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

impl ByteOrder {
    /// Returns the byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::BigEndian
        } else {
            Self::LittleEndian
        }
    }

    /// Returns true if this is the host byte order.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    /// Returns the opposite byte order.
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Self::BigEndian => Self::LittleEndian,
            Self::LittleEndian => Self::BigEndian,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigEndian => f.write_str("big-endian"),
            Self::LittleEndian => f.write_str("little-endian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_native() {
        assert_eq!(ByteOrder::default(), ByteOrder::native());
        assert!(ByteOrder::default().is_native());
    }

    #[test]
    fn swapped_is_involution() {
        assert_eq!(ByteOrder::BigEndian.swapped(), ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::BigEndian.swapped().swapped(), ByteOrder::BigEndian);
        assert!(!ByteOrder::native().swapped().is_native());
    }

    #[test]
    fn display() {
        assert_eq!(ByteOrder::BigEndian.to_string(), "big-endian");
        assert_eq!(ByteOrder::LittleEndian.to_string(), "little-endian");
    }
}
