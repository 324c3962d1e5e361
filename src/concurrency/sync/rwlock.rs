//! `SwitchableRwLock`: a reader-writer lock that can be switched off.
//!
//! Every collection in this crate stores its contents behind one of these.
//! The [`Safety`] passed at construction picks the strategy once:
//!
//! - [`Safety::Concurrent`]: a real `RwLock`. `write` blocks until no other
//!   holder is active, `read` may overlap other readers. Acquisition waits
//!   indefinitely; fairness is whatever the platform lock provides.
//! - [`Safety::Unsync`]: no synchronization. Acquisition is a single atomic
//!   update of a borrow counter and never waits.
//!
//! Callers never branch on the mode: both strategies hand out the same
//! [`ReadGuard`] / [`WriteGuard`] types, and dropping a guard releases it.
//!
//! ## Re-entrancy
//!
//! Neither mode is re-entrant. Acquiring the lock again while a conflicting
//! guard is held on the same thread deadlocks in concurrent mode and panics in
//! unsync mode.
//!
//! ## Poisoning
//!
//! A panic while a guard is held does not make the lock unusable: the
//! poisoned state is recovered and the data is handed out as-is.

use super::borrow::{BorrowFlag, ExclusiveBorrow, SharedBorrow};
use crate::Safety;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use std::sync::{LockResult, TryLockError, TryLockResult};

#[cfg(loom)]
use loom::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
#[cfg(not(loom))]
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

enum Inner<T> {
    Unsync {
        borrow: BorrowFlag,
        value: UnsafeCell<T>,
    },
    Concurrent(RwLock<T>),
}

/// A reader-writer lock whose synchronization is chosen at construction.
///
/// # Examples
///
/// ```
/// use dualmode::concurrency::sync::SwitchableRwLock;
/// use dualmode::Safety;
///
/// let lock = SwitchableRwLock::new(vec![1, 2], Safety::Concurrent);
/// lock.write().push(3);
/// assert_eq!(*lock.read(), [1, 2, 3]);
/// assert!(lock.is_safe());
/// ```
pub struct SwitchableRwLock<T> {
    inner: Inner<T>,
}

// SAFETY: the unsync variant only hands out references while the borrow
// counter proves there is no conflicting guard, so sharing the lock is as
// sound as sharing a `RwLock<T>`.
unsafe impl<T: Send + Sync> Sync for SwitchableRwLock<T> {}

impl<T> SwitchableRwLock<T> {
    /// Wraps `value` using the strategy selected by `safety`.
    pub fn new(value: T, safety: Safety) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(?safety, "creating switchable rwlock");
        let inner = match safety {
            Safety::Unsync => Inner::Unsync {
                borrow: BorrowFlag::new(),
                value: UnsafeCell::new(value),
            },
            Safety::Concurrent => Inner::Concurrent(RwLock::new(value)),
        };
        Self { inner }
    }

    /// Wraps `value` without synchronization.
    #[inline]
    pub fn unsync(value: T) -> Self {
        Self::new(value, Safety::Unsync)
    }

    /// Wraps `value` behind a real reader-writer lock.
    #[inline]
    pub fn concurrent(value: T) -> Self {
        Self::new(value, Safety::Concurrent)
    }

    /// The mode this lock was built with.
    #[inline]
    pub fn safety(&self) -> Safety {
        match self.inner {
            Inner::Unsync { .. } => Safety::Unsync,
            Inner::Concurrent(_) => Safety::Concurrent,
        }
    }

    /// Returns `true` if this lock synchronizes across threads.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.safety().is_concurrent()
    }

    /// Acquires shared access.
    ///
    /// # Panics
    ///
    /// In unsync mode, panics if an exclusive guard is outstanding.
    #[inline]
    pub fn read(&self) -> ReadGuard<'_, T> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.shared();
                // SAFETY: the shared borrow excludes every exclusive guard.
                ReadInner::Unsync {
                    value: unsafe { &*value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(lock) => ReadInner::Concurrent(recover(lock.read())),
        };
        ReadGuard { inner }
    }

    /// Acquires exclusive access.
    ///
    /// # Panics
    ///
    /// In unsync mode, panics if any other guard is outstanding.
    #[inline]
    pub fn write(&self) -> WriteGuard<'_, T> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.exclusive();
                // SAFETY: the exclusive borrow excludes every other guard.
                WriteInner::Unsync {
                    value: unsafe { &mut *value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(lock) => WriteInner::Concurrent(recover(lock.write())),
        };
        WriteGuard { inner }
    }

    /// Attempts shared access without waiting.
    pub fn try_read(&self) -> Option<ReadGuard<'_, T>> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.try_shared()?;
                // SAFETY: the shared borrow excludes every exclusive guard.
                ReadInner::Unsync {
                    value: unsafe { &*value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(lock) => ReadInner::Concurrent(try_recover(lock.try_read())?),
        };
        Some(ReadGuard { inner })
    }

    /// Attempts exclusive access without waiting.
    pub fn try_write(&self) -> Option<WriteGuard<'_, T>> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.try_exclusive()?;
                // SAFETY: the exclusive borrow excludes every other guard.
                WriteInner::Unsync {
                    value: unsafe { &mut *value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(lock) => WriteInner::Concurrent(try_recover(lock.try_write())?),
        };
        Some(WriteGuard { inner })
    }

    /// Returns `true` if any guard is currently held.
    ///
    /// Only a hint in concurrent mode; the answer may be stale on return.
    pub fn is_locked(&self) -> bool {
        match &self.inner {
            Inner::Unsync { borrow, .. } => borrow.is_borrowed(),
            Inner::Concurrent(_) => self.try_write().is_none(),
        }
    }

    /// Returns a mutable reference to the value without locking; the
    /// exclusive borrow of `self` already rules out other guards.
    #[cfg(not(loom))]
    pub fn get_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Inner::Unsync { value, .. } => value.get_mut(),
            Inner::Concurrent(lock) => recover(lock.get_mut()),
        }
    }

    /// Consumes the lock and returns the wrapped value.
    pub fn into_inner(self) -> T {
        match self.inner {
            Inner::Unsync { value, .. } => value.into_inner(),
            Inner::Concurrent(lock) => recover(lock.into_inner()),
        }
    }
}

/// Acquires shared access to both locks, taking them in address order so
/// that two threads comparing the same pair in opposite directions cannot
/// interleave with waiting writers into a deadlock.
///
/// The guards are returned in argument order. `a` and `b` must be distinct.
pub(crate) fn read_pair<'a, T>(
    a: &'a SwitchableRwLock<T>,
    b: &'a SwitchableRwLock<T>,
) -> (ReadGuard<'a, T>, ReadGuard<'a, T>) {
    debug_assert!(!core::ptr::eq(a, b), "read_pair on the same lock");
    if (a as *const SwitchableRwLock<T>) < (b as *const SwitchableRwLock<T>) {
        let first = a.read();
        (first, b.read())
    } else {
        let second = b.read();
        (a.read(), second)
    }
}

fn recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(|poisoned| {
        #[cfg(feature = "tracing")]
        tracing::warn!("recovering poisoned collection lock");
        poisoned.into_inner()
    })
}

fn try_recover<G>(result: TryLockResult<G>) -> Option<G> {
    match result {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(recover(Err(poisoned))),
        Err(TryLockError::WouldBlock) => None,
    }
}

impl<T: Clone> Clone for SwitchableRwLock<T> {
    /// Copies the current value into a new lock with the same mode.
    fn clone(&self) -> Self {
        let value = self.read().clone();
        Self::new(value, self.safety())
    }
}

impl<T: Default> Default for SwitchableRwLock<T> {
    fn default() -> Self {
        Self::unsync(T::default())
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for SwitchableRwLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut d = f.debug_struct("SwitchableRwLock");
        d.field("safety", &self.safety());
        match self.try_read() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish()
    }
}

enum ReadInner<'a, T> {
    Unsync {
        value: &'a T,
        _borrow: SharedBorrow<'a>,
    },
    Concurrent(RwLockReadGuard<'a, T>),
}

/// Shared access to the value of a [`SwitchableRwLock`]. Released on drop.
pub struct ReadGuard<'a, T> {
    inner: ReadInner<'a, T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match &self.inner {
            ReadInner::Unsync { value, .. } => value,
            ReadInner::Concurrent(guard) => guard,
        }
    }
}

enum WriteInner<'a, T> {
    Unsync {
        value: &'a mut T,
        _borrow: ExclusiveBorrow<'a>,
    },
    Concurrent(RwLockWriteGuard<'a, T>),
}

/// Exclusive access to the value of a [`SwitchableRwLock`]. Released on drop.
pub struct WriteGuard<'a, T> {
    inner: WriteInner<'a, T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match &self.inner {
            WriteInner::Unsync { value, .. } => value,
            WriteInner::Concurrent(guard) => guard,
        }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            WriteInner::Unsync { value, .. } => value,
            WriteInner::Concurrent(guard) => guard,
        }
    }
}
