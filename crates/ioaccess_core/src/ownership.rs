//! Single-thread ownership of an access.
//!
//! Ownership is a usage discipline, not a lock: a call from any thread other
//! than the owner fails immediately and never waits.

use crate::error::{AccessError, AccessResult};
use std::thread::{self, ThreadId};

/// Owner token of an access. `None` means any thread may use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Ownership(Option<ThreadId>);

impl Ownership {
    /// Ownership bound to the calling thread.
    pub(crate) fn current() -> Self {
        Self(Some(thread::current().id()))
    }

    /// Unrestricted ownership.
    pub(crate) const fn unowned() -> Self {
        Self(None)
    }

    pub(crate) fn owner(self) -> Option<ThreadId> {
        self.0
    }

    pub(crate) fn is_owned(self) -> bool {
        self.0.is_some()
    }

    /// Fails unless the calling thread may use the access.
    pub(crate) fn check(self) -> AccessResult<()> {
        match self.0 {
            Some(owner) => {
                let caller = thread::current().id();
                if caller == owner {
                    Ok(())
                } else {
                    Err(AccessError::Ownership { owner, caller })
                }
            }
            None => Ok(()),
        }
    }

    /// Replaces the owner. Only the current owner, or anyone when unowned,
    /// may do this.
    pub(crate) fn transfer(&mut self, owner: Option<ThreadId>) -> AccessResult<()> {
        self.check()?;
        self.0 = owner;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unowned_allows_everyone() {
        let ownership = Ownership::unowned();
        assert!(!ownership.is_owned());
        let result = thread::spawn(move || ownership.check().is_ok()).join().unwrap();
        assert!(result);
    }

    #[test]
    fn owned_rejects_other_threads() {
        let ownership = Ownership::current();
        assert!(ownership.check().is_ok());

        let rejected = thread::spawn(move || matches!(ownership.check(), Err(AccessError::Ownership { .. })))
            .join()
            .unwrap();
        assert!(rejected);
    }

    #[test]
    fn transfer_requires_current_owner() {
        let mut ownership = Ownership::current();
        let other = thread::spawn(|| thread::current().id()).join().unwrap();

        ownership.transfer(Some(other)).unwrap();
        assert_eq!(ownership.owner(), Some(other));
        // no longer the owner here
        assert!(ownership.transfer(None).is_err());
    }
}
