//! Slicing, copying and filling.

use super::backing::Backing;
use super::Access;
use crate::error::{AccessError, AccessResult, Permission};
use ioaccess_storage::StorageResult;
use tracing::trace;

/// Copies directly between two native backings of the same kind.
///
/// Returns `None` when the pair has no direct path and the caller must go
/// through a buffer.
fn copy_native(dst: &mut Backing, index: u64, src: &Backing, offset: u64, len: usize) -> Option<StorageResult<()>> {
    match (dst, src) {
        (Backing::Scoped(dst), Backing::Scoped(src)) => Some(dst.copy_from_memory(index, src, offset, len)),
        (Backing::Raw(dst), Backing::Raw(src)) => Some(dst.copy_from_memory(index, src, offset, len)),
        _ => None,
    }
}

impl Access {
    /// Creates an access over `len` bytes starting at `offset`.
    ///
    /// The slice shares storage with this access and inherits its
    /// permissions, indexing, byte order and owner. Its cursor starts at 0.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Unsupported`] if the backend cannot slice, or
    /// [`AccessError::Bounds`] if the range exceeds the length.
    pub fn slice(&mut self, offset: u64, len: u64) -> AccessResult<Access> {
        self.check_live()?;
        if !self.backing.can_slice() {
            return Err(AccessError::unsupported(format!("slice on {} backend", self.backing.kind())));
        }
        self.check_span(offset, len)?;

        let mut backing = self.backing.slice(offset, len)?;
        backing.backend().set_byte_order(self.byte_order);
        trace!(offset, len, kind = %backing.kind(), "sliced access");

        Ok(Self {
            backing,
            cursor: 0,
            length: Some(len),
            indexed: self.indexed,
            can_read: self.can_read,
            can_write: self.can_write,
            byte_order: self.byte_order,
            ownership: self.ownership,
            released: false,
        })
    }

    /// Creates an access over `len` bytes starting at the cursor.
    ///
    /// # Errors
    ///
    /// See [`slice`](Self::slice).
    pub fn slice_here(&mut self, len: u64) -> AccessResult<Access> {
        self.slice(self.cursor, len)
    }

    /// Copies `len` bytes from `source` at `offset` into this access at
    /// `index`. Neither cursor moves.
    ///
    /// Scoped-to-scoped and raw-to-raw copies move memory directly.
    /// Other pairs go through a buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if either access fails its checks or a backend fails.
    pub fn copy_from_at(&mut self, source: &mut Access, index: u64, offset: u64, len: usize) -> AccessResult<()> {
        self.check_at(Permission::Write, "copy_from_at", index, len as u64)?;
        source.check_at(Permission::Read, "copy_from_at", offset, len as u64)?;

        match copy_native(&mut self.backing, index, &source.backing, offset, len) {
            Some(result) => result?,
            None => self
                .backing
                .backend()
                .copy_from_at(source.backing.backend(), index, offset, len)?,
        }
        Ok(())
    }

    /// Copies `len` bytes from `source` at `offset` to the cursor of this
    /// access, advancing it. The cursor of `source` does not move.
    ///
    /// # Errors
    ///
    /// Returns an error if either access fails its checks or a backend fails.
    pub fn copy_from_offset(&mut self, source: &mut Access, offset: u64, len: usize) -> AccessResult<()> {
        self.check_sequential(Permission::Write, len as u64)?;
        source.check_at(Permission::Read, "copy_from_offset", offset, len as u64)?;

        match copy_native(&mut self.backing, self.cursor, &source.backing, offset, len) {
            Some(result) => result?,
            None => {
                let data = source.backing.backend().get_bytes(offset, len)?;
                self.backing.write_bytes(self.cursor, &data)?;
            }
        }
        self.advance(len as u64);
        Ok(())
    }

    /// Copies `len` bytes from the cursor of `source` to the cursor of this
    /// access. Both cursors advance.
    ///
    /// # Errors
    ///
    /// Returns an error if either access fails its checks or a backend fails.
    pub fn copy_from(&mut self, source: &mut Access, len: usize) -> AccessResult<()> {
        self.check_sequential(Permission::Write, len as u64)?;
        source.check_sequential(Permission::Read, len as u64)?;

        match copy_native(&mut self.backing, self.cursor, &source.backing, source.cursor, len) {
            Some(result) => result?,
            None => {
                let data = source.backing.read_bytes(source.cursor, len)?;
                self.backing.write_bytes(self.cursor, &data)?;
            }
        }
        self.advance(len as u64);
        source.advance(len as u64);
        Ok(())
    }

    /// Writes `byte` over every remaining byte and moves the cursor to the
    /// end.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Unsupported`] on an unbounded access, or an
    /// error if the access is not writable.
    pub fn fill(&mut self, byte: u8) -> AccessResult<()> {
        self.check_live()?;
        self.check_permission(Permission::Write)?;
        let length = self
            .length
            .ok_or_else(|| AccessError::unsupported("fill on an unbounded access"))?;
        let remaining = length.saturating_sub(self.cursor);
        let len = usize::try_from(remaining).map_err(|_| AccessError::Bounds {
            position: self.cursor,
            len: remaining,
            length,
        })?;

        self.backing.fill(self.cursor, len, byte)?;
        self.cursor = length;
        Ok(())
    }

    /// Zeroes the whole access and leaves the cursor at 0.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Unsupported`] on a non-indexed or unbounded
    /// access, or an error if the access is not writable.
    pub fn clear(&mut self) -> AccessResult<()> {
        self.check_live()?;
        self.check_permission(Permission::Write)?;
        self.check_indexed("clear")?;
        self.set_index(0)?;
        self.fill(0)?;
        self.set_index(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Access, AccessError, AccessOptions, ByteOrder, Permission};
    use std::thread;

    fn every_kind(size: usize) -> Vec<Access> {
        vec![
            Access::allocate(size),
            Access::scoped_memory(size).unwrap(),
            Access::raw(size).unwrap(),
        ]
    }

    #[test]
    fn fill_then_clear() {
        for mut access in every_kind(100) {
            access.fill(0xAB).unwrap();
            assert_eq!(access.index(), 100);
            assert_eq!(access.get_bytes(0, 100).unwrap(), vec![0xAB; 100]);

            access.clear().unwrap();
            assert_eq!(access.index(), 0);
            assert_eq!(access.get_bytes(0, 100).unwrap(), vec![0; 100]);
        }
    }

    #[test]
    fn fill_covers_only_the_remainder() {
        let mut access = Access::allocate(8);
        access.set_index(6).unwrap();
        access.fill(1).unwrap();
        assert_eq!(access.get_bytes(0, 8).unwrap(), vec![0, 0, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn fill_needs_a_length() {
        let dir = tempfile::tempdir().unwrap();
        let mut access = Access::random_access(&dir.path().join("f.bin"), true, true).unwrap();
        assert!(matches!(access.fill(0), Err(AccessError::Unsupported { .. })));
    }

    #[test]
    fn fill_needs_write() {
        let mut access = Access::allocate_with(4, AccessOptions::read_only());
        assert!(matches!(access.fill(0), Err(AccessError::Permission { required: Permission::Write })));
        assert!(matches!(access.clear(), Err(AccessError::Permission { .. })));
    }

    #[test]
    fn slice_reads_exact_bytes() {
        for mut access in every_kind(32) {
            let data: Vec<u8> = (0..32).collect();
            access.set_bytes(0, &data).unwrap();

            let mut slice = access.slice(10, 8).unwrap();
            assert_eq!(slice.length(), Some(8));
            assert_eq!(slice.index(), 0);
            assert_eq!(slice.read_bytes(8).unwrap(), &data[10..18]);
            assert!(matches!(slice.read(), Err(AccessError::Bounds { .. })));
        }
    }

    #[test]
    fn slice_writes_reach_parent() {
        for mut access in every_kind(16) {
            let mut slice = access.slice(4, 4).unwrap();
            slice.write_bytes(&[9, 9, 9, 9]).unwrap();
            assert_eq!(access.get_bytes(0, 8).unwrap(), vec![0, 0, 0, 0, 9, 9, 9, 9]);
        }
    }

    #[test]
    fn slice_inherits_owner_and_order() {
        let mut access = Access::scoped_memory(16).unwrap();
        access.set_byte_order(ByteOrder::BigEndian).unwrap();
        access.set_u32(8, 0x0102_0304).unwrap();

        let mut slice = access.slice(8, 8).unwrap();
        assert_eq!(slice.owner(), Some(thread::current().id()));
        assert_eq!(slice.byte_order(), ByteOrder::BigEndian);
        assert_eq!(slice.read_u32().unwrap(), 0x0102_0304);

        let read_only = Access::allocate_with(8, AccessOptions::read_only()).slice(0, 4).unwrap();
        assert!(read_only.can_read() && !read_only.can_write());
    }

    #[test]
    fn slice_here_starts_at_cursor() {
        let mut access = Access::from_bytes(vec![1, 2, 3, 4, 5]);
        access.skip(2).unwrap();
        let mut slice = access.slice_here(3).unwrap();
        assert_eq!(slice.read_bytes(3).unwrap(), vec![3, 4, 5]);
    }

    #[test]
    fn slice_out_of_range_or_unsupported() {
        let mut access = Access::allocate(8);
        assert!(matches!(access.slice(4, 5), Err(AccessError::Bounds { .. })));

        let mut stream = Access::stream_reader(&b"abc"[..]);
        assert!(matches!(stream.slice(0, 1), Err(AccessError::Unsupported { .. })));
    }

    #[test]
    fn copy_between_every_pair() {
        for mut source in every_kind(16) {
            source.set_bytes(0, b"0123456789abcdef").unwrap();
            for mut target in every_kind(16) {
                target.copy_from_at(&mut source, 4, 10, 6).unwrap();
                assert_eq!(target.get_bytes(4, 6).unwrap(), b"abcdef");

                target.copy_from_offset(&mut source, 0, 4).unwrap();
                assert_eq!(target.index(), 4);
                assert_eq!(target.get_bytes(0, 4).unwrap(), b"0123");
            }
        }
    }

    #[test]
    fn copy_from_advances_both() {
        for mut source in every_kind(8) {
            source.write_bytes(b"abcdefgh").unwrap();
            source.flip().unwrap();
            source.skip(2).unwrap();
            for mut target in every_kind(8) {
                target.copy_from(&mut source, 3).unwrap();
                assert_eq!(target.index(), 3);
                assert_eq!(target.get_bytes(0, 3).unwrap(), b"cde");
                source.set_index(2).unwrap();
            }
            assert_eq!(source.index(), 2);
        }
    }

    #[test]
    fn copy_within_one_scope_overlaps() {
        let mut access = Access::scoped_memory(8).unwrap();
        access.set_bytes(0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let mut view = access.slice(0, 8).unwrap();
        access.copy_from_at(&mut view, 2, 0, 6).unwrap();
        assert_eq!(access.get_bytes(0, 8).unwrap(), vec![1, 2, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn copy_checks_both_sides() {
        let mut source = Access::allocate_with(4, AccessOptions::write_only());
        let mut target = Access::allocate(4);
        assert!(matches!(
            target.copy_from_at(&mut source, 0, 0, 4),
            Err(AccessError::Permission { required: Permission::Read })
        ));

        let mut source = Access::allocate(4);
        assert!(matches!(target.copy_from_at(&mut source, 2, 0, 4), Err(AccessError::Bounds { .. })));
        assert!(matches!(target.copy_from(&mut source, 5), Err(AccessError::Bounds { .. })));
        assert_eq!(target.index(), 0);
        assert_eq!(source.index(), 0);
    }
}
