//! Thread ownership and release-once semantics across backends.

use ioaccess_core::{Access, AccessError};
use ioaccess_testkit::{stress_ownership_handoff, StressConfig, TestAccess, BOUNDED_KINDS};
use std::sync::mpsc;
use std::thread;

fn rejected_elsewhere(access: Access) -> (Access, bool) {
    thread::spawn(move || {
        let mut access = access;
        let checks = [
            matches!(access.read_u8(), Err(AccessError::Ownership { .. })),
            matches!(access.set_u32(0, 1), Err(AccessError::Ownership { .. })),
            matches!(access.flip(), Err(AccessError::Ownership { .. })),
            matches!(access.acquire_ownership(), Err(AccessError::Ownership { .. })),
            matches!(access.release(), Err(AccessError::Ownership { .. })),
        ];
        (access, checks.iter().all(|&c| c))
    })
    .join()
    .unwrap()
}

#[test]
fn owned_access_rejects_other_threads_until_cleared() {
    for kind in BOUNDED_KINDS {
        let mut fixture = TestAccess::of_kind(kind, 16);
        fixture.access.acquire_ownership().unwrap();

        let access = std::mem::replace(&mut fixture.access, Access::allocate(0));
        let (mut access, rejected) = rejected_elsewhere(access);
        assert!(rejected, "{kind}");
        assert!(!access.is_released());

        access.set_owner(None).unwrap();
        let access = thread::spawn(move || {
            let mut access = access;
            access.write_u32(0xFEED).unwrap();
            access.acquire_ownership().unwrap();
            access
        })
        .join()
        .unwrap();

        // the spawned thread took ownership before finishing
        let (_, rejected) = rejected_elsewhere(access);
        assert!(rejected);
    }
}

#[test]
fn native_accesses_start_owned() {
    let scoped = Access::scoped_memory(8).unwrap();
    let raw = Access::raw(8).unwrap();
    assert!(scoped.is_owned() && raw.is_owned());

    let (_, rejected) = rejected_elsewhere(scoped);
    assert!(rejected);
    let (_, rejected) = rejected_elsewhere(raw);
    assert!(rejected);
}

#[test]
fn handoff_to_named_thread() {
    let (tx, rx) = mpsc::channel::<Access>();
    let worker = thread::spawn(move || {
        let mut access = rx.recv().unwrap();
        access.write_u16(7).unwrap();
        access
    });

    let mut access = Access::scoped_memory(4).unwrap();
    access.set_owner(Some(worker.thread().id())).unwrap();
    assert!(matches!(access.read_u8(), Err(AccessError::Ownership { .. })));
    // the previous owner can no longer hand it back either
    assert!(access.set_owner(None).is_err());
    tx.send(access).unwrap();

    let access = worker.join().unwrap();
    assert_eq!(access.index(), 2);
}

#[test]
fn release_once_every_kind() {
    for kind in BOUNDED_KINDS {
        let mut access = TestAccess::of_kind(kind, 8);
        access.release().unwrap();
        assert!(access.is_released());
        assert!(matches!(access.release(), Err(AccessError::Released)), "{kind}");
        assert!(matches!(access.write_u8(1), Err(AccessError::Released)));
        assert!(matches!(access.get_u8(0), Err(AccessError::Released)));
        assert!(matches!(access.slice(0, 1), Err(AccessError::Released)));
        assert!(matches!(access.fill(0), Err(AccessError::Released)));
    }
}

#[test]
fn released_scope_invalidates_slices() {
    let mut parent = Access::scoped_memory(16).unwrap();
    let mut slice = parent.slice(4, 4).unwrap();
    parent.release().unwrap();

    assert!(!slice.is_released());
    assert!(matches!(slice.read_u32(), Err(AccessError::Released)));
    assert!(matches!(slice.set_u8(0, 1), Err(AccessError::Released)));
}

#[test]
fn ring_handoff_stress() {
    let config = StressConfig {
        operations: 300,
        threads: 4,
        access_size: 16,
    };
    let result = stress_ownership_handoff(&config);
    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.successful_ops, 300);
}
