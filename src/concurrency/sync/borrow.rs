//! Non-blocking borrow counter used by the unsynchronized guard mode.
//!
//! Uses a single `AtomicIsize`:
//! - `0`: free
//! - `N > 0`: N shared borrows
//! - `-1`: exclusive borrow
//!
//! Acquisition never waits. A conflicting acquisition can only come from
//! re-entrancy or from sharing an unsynchronized collection between threads,
//! and panics instead of handing out aliasing references.

#[cfg(loom)]
use loom::sync::atomic::{AtomicIsize, Ordering};
#[cfg(not(loom))]
use core::sync::atomic::{AtomicIsize, Ordering};

const WRITING: isize = -1;

pub(crate) struct BorrowFlag {
    state: AtomicIsize,
}

impl BorrowFlag {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicIsize::new(0),
        }
    }

    #[inline]
    pub(crate) fn is_borrowed(&self) -> bool {
        self.state.load(Ordering::Relaxed) != 0
    }

    #[inline]
    pub(crate) fn try_shared(&self) -> Option<SharedBorrow<'_>> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == WRITING {
                return None;
            }
            match self.state.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(SharedBorrow { flag: self }),
                Err(actual) => current = actual,
            }
        }
    }

    #[inline]
    pub(crate) fn try_exclusive(&self) -> Option<ExclusiveBorrow<'_>> {
        self.state
            .compare_exchange(0, WRITING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExclusiveBorrow { flag: self })
    }

    /// # Panics
    ///
    /// Panics if an exclusive borrow is outstanding.
    #[inline]
    pub(crate) fn shared(&self) -> SharedBorrow<'_> {
        match self.try_shared() {
            Some(borrow) => borrow,
            None => conflict("shared"),
        }
    }

    /// # Panics
    ///
    /// Panics if any borrow is outstanding.
    #[inline]
    pub(crate) fn exclusive(&self) -> ExclusiveBorrow<'_> {
        match self.try_exclusive() {
            Some(borrow) => borrow,
            None => conflict("exclusive"),
        }
    }
}

#[cold]
#[inline(never)]
fn conflict(kind: &str) -> ! {
    panic!(
        "{kind} access to an unsynchronized collection conflicts with an outstanding borrow; \
         it was re-entered or shared across threads without Safety::Concurrent"
    )
}

pub(crate) struct SharedBorrow<'a> {
    flag: &'a BorrowFlag,
}

impl Drop for SharedBorrow<'_> {
    #[inline]
    fn drop(&mut self) {
        let prev = self.flag.state.fetch_sub(1, Ordering::Release);
        debug_assert!(prev > 0, "shared borrow count underflow");
    }
}

pub(crate) struct ExclusiveBorrow<'a> {
    flag: &'a BorrowFlag,
}

impl Drop for ExclusiveBorrow<'_> {
    #[inline]
    fn drop(&mut self) {
        let prev = self.flag.state.swap(0, Ordering::Release);
        debug_assert_eq!(prev, WRITING, "expected an exclusive borrow");
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn shared_borrows_stack() {
        let flag = BorrowFlag::new();
        let a = flag.shared();
        let b = flag.shared();
        assert!(flag.is_borrowed());
        assert!(flag.try_exclusive().is_none());
        drop(a);
        drop(b);
        assert!(!flag.is_borrowed());
        assert!(flag.try_exclusive().is_some());
    }

    #[test]
    fn exclusive_blocks_everything() {
        let flag = BorrowFlag::new();
        let guard = flag.exclusive();
        assert!(flag.try_shared().is_none());
        assert!(flag.try_exclusive().is_none());
        drop(guard);
        assert!(flag.try_shared().is_some());
    }

    #[test]
    #[should_panic(expected = "unsynchronized collection")]
    fn conflicting_exclusive_panics() {
        let flag = BorrowFlag::new();
        let _shared = flag.shared();
        let _ = flag.exclusive();
    }
}
