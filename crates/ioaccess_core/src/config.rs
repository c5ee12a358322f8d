//! Access configuration.

use ioaccess_codec::ByteOrder;

/// Configuration for constructing an [`Access`](crate::Access).
///
/// Constructors that take options use them for everything they do not
/// derive from the backend itself. A heap access, for example, always takes
/// its length from the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOptions {
    /// Declared length in bytes. `None` means unbounded.
    pub length: Option<u64>,

    /// Whether absolute-offset operations are permitted.
    pub indexed: bool,

    /// Whether reads are permitted.
    pub can_read: bool,

    /// Whether writes are permitted.
    pub can_write: bool,

    /// Byte order for multi-byte typed values.
    pub byte_order: ByteOrder,

    /// Whether the access is owned by the constructing thread.
    pub bind_to_current_thread: bool,
}

impl Default for AccessOptions {
    fn default() -> Self {
        Self {
            length: None,
            indexed: true,
            can_read: true,
            can_write: true,
            byte_order: ByteOrder::native(),
            bind_to_current_thread: false,
        }
    }
}

impl AccessOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a read-only access.
    #[must_use]
    pub fn read_only() -> Self {
        Self::default().can_write(false)
    }

    /// Options for a write-only access.
    #[must_use]
    pub fn write_only() -> Self {
        Self::default().can_read(false)
    }

    /// Sets the declared length.
    #[must_use]
    pub const fn length(mut self, length: Option<u64>) -> Self {
        self.length = length;
        self
    }

    /// Sets whether absolute-offset operations are permitted.
    #[must_use]
    pub const fn indexed(mut self, value: bool) -> Self {
        self.indexed = value;
        self
    }

    /// Sets whether reads are permitted.
    #[must_use]
    pub const fn can_read(mut self, value: bool) -> Self {
        self.can_read = value;
        self
    }

    /// Sets whether writes are permitted.
    #[must_use]
    pub const fn can_write(mut self, value: bool) -> Self {
        self.can_write = value;
        self
    }

    /// Sets the byte order.
    #[must_use]
    pub const fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Sets whether the access is owned by the constructing thread.
    #[must_use]
    pub const fn bind_to_current_thread(mut self, value: bool) -> Self {
        self.bind_to_current_thread = value;
        self
    }
}
