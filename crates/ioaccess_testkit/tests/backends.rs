//! Cross-backend behavior of the access front-end.

use ioaccess_core::{Access, AccessError, BackendKind, ByteOrder, Permission, TextEncoding, Uuid};
use ioaccess_testkit::{codec_vectors, init_test_tracing, with_each_kind, with_each_memory_kind, TestAccess};

#[test]
fn write_then_read_every_kind() {
    init_test_tracing();
    with_each_kind(64, |access| {
        access.set_byte_order(ByteOrder::BigEndian).unwrap();
        access.write_i8(-3).unwrap();
        access.write_u16(0xBEEF).unwrap();
        access.write_i32(-123_456).unwrap();
        access.write_u64(u64::MAX - 1).unwrap();
        access.write_f32(1.5).unwrap();
        access.write_f64(-0.25).unwrap();
        access.write_bool(true).unwrap();
        access.write_bytes(b"tail").unwrap();
        let end = access.index();

        access.flip().unwrap();
        assert_eq!(access.read_i8().unwrap(), -3);
        assert_eq!(access.read_u16().unwrap(), 0xBEEF);
        assert_eq!(access.read_i32().unwrap(), -123_456);
        assert_eq!(access.read_u64().unwrap(), u64::MAX - 1);
        assert_eq!(access.read_f32().unwrap(), 1.5);
        assert_eq!(access.read_f64().unwrap(), -0.25);
        assert!(access.read_bool().unwrap());
        assert_eq!(access.read_bytes(4).unwrap(), b"tail");
        assert_eq!(access.index(), end, "{}", access.kind);
    });
}

#[test]
fn concrete_big_endian_ints() {
    with_each_kind(16, |access| {
        access.set_byte_order(ByteOrder::BigEndian).unwrap();
        access.write_i32(0x1122_3344).unwrap();
        access.write_i32(0x5566_7788).unwrap();
        access.flip().unwrap();

        assert_eq!(access.get_i32(0).unwrap(), 0x1122_3344);
        assert_eq!(access.get_i32(4).unwrap(), 0x5566_7788);
        assert_eq!(access.get_bytes(0, 4).unwrap(), vec![0x11, 0x22, 0x33, 0x44]);
    });
}

#[test]
fn codec_vectors_hold_for_every_kind() {
    for vector in codec_vectors() {
        let expected = vector.expected();
        with_each_kind(16, |access| {
            access.set_byte_order(vector.order).unwrap();
            vector.value.set_at(access, 3).unwrap();
            assert_eq!(access.get_bytes(3, expected.len()).unwrap(), expected, "{} on {}", vector.id, access.kind);
            let read = vector.value.get_like(access, 3).unwrap();
            assert!(read.same_bits(&vector.value), "{} on {}", vector.id, access.kind);
        });
    }
}

#[test]
fn bounds_are_uniform() {
    with_each_kind(8, |access| {
        access.set_index(6).unwrap();
        assert!(matches!(access.write_u32(1), Err(AccessError::Bounds { position: 6, len: 4, length: 8 })));
        assert_eq!(access.index(), 6);
        assert!(matches!(access.get_u64(1), Err(AccessError::Bounds { .. })));
        assert!(matches!(access.set_bytes(8, &[1]), Err(AccessError::Bounds { .. })));
        access.set_bytes(8, &[]).unwrap();
    });
}

#[test]
fn strings_and_ids_every_kind() {
    let id = Uuid::new_v4();
    with_each_kind(128, |access| {
        access.write_string_byte("short", TextEncoding::Utf8).unwrap();
        access.write_string_short("ünïcødé", TextEncoding::Utf16Le).unwrap();
        access.write_uuid(id).unwrap();
        access.flip().unwrap();

        assert_eq!(access.read_string_byte(TextEncoding::Utf8).unwrap(), "short");
        assert_eq!(access.read_string_short(TextEncoding::Utf16Le).unwrap(), "ünïcødé");
        assert_eq!(access.read_uuid().unwrap(), id);
    });
}

#[test]
fn long_string_needs_short_prefix() {
    let text: String = "abc".repeat(100);
    with_each_memory_kind(512, |access| {
        assert!(matches!(
            access.write_string_byte(&text, TextEncoding::Utf8),
            Err(AccessError::EncodingTooLong { len: 300, max: 255 })
        ));
        assert_eq!(access.index(), 0);

        access.write_string_short(&text, TextEncoding::Utf8).unwrap();
        access.flip().unwrap();
        assert_eq!(access.read_string_short(TextEncoding::Utf8).unwrap(), text);
    });
}

#[test]
fn fill_and_clear_every_kind() {
    with_each_kind(100, |access| {
        access.fill(0x5A).unwrap();
        assert_eq!(access.index(), 100);
        assert_eq!(access.remaining(), Some(0));
        assert_eq!(access.get_bytes(0, 100).unwrap(), vec![0x5A; 100]);

        access.clear().unwrap();
        assert_eq!(access.index(), 0);
        assert_eq!(access.get_bytes(0, 100).unwrap(), vec![0; 100]);
    });
}

#[test]
fn slices_match_parent_ranges() {
    with_each_memory_kind(64, |access| {
        let data: Vec<u8> = (0..64).map(|i| i * 3).collect();
        access.set_bytes(0, &data).unwrap();

        for (offset, len) in [(0u64, 64u64), (5, 10), (63, 1), (64, 0)] {
            let mut slice = access.slice(offset, len).unwrap();
            let bytes = slice.read_bytes(len as usize).unwrap();
            assert_eq!(bytes, &data[offset as usize..(offset + len) as usize], "{}", access.kind);
        }
    });
}

#[test]
fn nested_slices() {
    with_each_memory_kind(32, |access| {
        let mut outer = access.slice(8, 16).unwrap();
        let mut inner = outer.slice(4, 4).unwrap();
        inner.write_u32(0xAABB_CCDD).unwrap();

        let byte_order = access.byte_order();
        let expected = match byte_order {
            ByteOrder::BigEndian => [0xAA, 0xBB, 0xCC, 0xDD],
            ByteOrder::LittleEndian => [0xDD, 0xCC, 0xBB, 0xAA],
        };
        assert_eq!(access.get_bytes(12, 4).unwrap(), expected);
    });
}

#[test]
fn cross_kind_copies() {
    let kinds = [BackendKind::Heap, BackendKind::Scoped, BackendKind::Raw, BackendKind::File];
    for from in kinds {
        for to in kinds {
            let mut source = TestAccess::of_kind(from, 32);
            let mut target = TestAccess::of_kind(to, 32);
            source.set_bytes(0, &[7; 32]).unwrap();
            source.set_bytes(8, b"payload!").unwrap();

            target.copy_from_at(&mut source, 20, 8, 8).unwrap();
            assert_eq!(target.get_bytes(20, 8).unwrap(), b"payload!", "{from} -> {to}");

            source.set_index(8).unwrap();
            target.copy_from(&mut source, 8).unwrap();
            assert_eq!(target.get_bytes(0, 8).unwrap(), b"payload!", "{from} -> {to}");
            assert_eq!((source.index(), target.index()), (16, 8));
        }
    }
}

#[test]
fn read_only_and_write_only_kinds() {
    let mut reader = Access::stream_reader(&b"\x00\x2a"[..]);
    assert!(matches!(reader.write_u8(1), Err(AccessError::Permission { required: Permission::Write })));
    reader.set_byte_order(ByteOrder::BigEndian).unwrap();
    assert_eq!(reader.read_u16().unwrap(), 42);
    assert!(matches!(reader.get_u8(0), Err(AccessError::Unsupported { .. })));
    assert!(reader.read_u8().is_err());
}
