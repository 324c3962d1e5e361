use super::borrow::{BorrowFlag, ExclusiveBorrow};
use crate::Safety;
use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use std::sync::{LockResult, TryLockError};

#[cfg(loom)]
use loom::sync::{Mutex, MutexGuard};
#[cfg(not(loom))]
use std::sync::{Mutex, MutexGuard};

enum Inner<T> {
    Unsync {
        borrow: BorrowFlag,
        value: UnsafeCell<T>,
    },
    Concurrent(Mutex<T>),
}

/// An exclusive lock whose synchronization is chosen at construction.
///
/// The exclusive-only sibling of
/// [`SwitchableRwLock`](super::SwitchableRwLock): in concurrent mode `lock`
/// blocks until the current holder releases; in unsync mode it only flips a
/// borrow counter and panics on a conflicting acquisition.
///
/// Reach for it to guard caller-owned state that should follow the same
/// [`Safety`] switch as the collections it sits next to. Since a guard never
/// hands out more than one reference, it is `Sync` whenever `T: Send`, so it
/// can share values such as `Cell` or `RefCell` that `SwitchableRwLock`
/// cannot.
///
/// # Examples
///
/// ```
/// use dualmode::concurrency::sync::SwitchableMutex;
/// use dualmode::{Safety, Set};
/// use std::cell::RefCell;
/// use std::sync::Arc;
/// use std::thread;
///
/// let safety = Safety::Concurrent;
/// let seen = Arc::new(Set::with_safety(safety));
/// let log = Arc::new(SwitchableMutex::new(RefCell::new(Vec::new()), safety));
///
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let (seen, log) = (Arc::clone(&seen), Arc::clone(&log));
///         thread::spawn(move || {
///             if seen.insert(t % 2) {
///                 log.lock().borrow_mut().push(t % 2);
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// let mut first_seen = log.lock().take();
/// first_seen.sort_unstable();
/// assert_eq!(first_seen, [0, 1]);
/// ```
pub struct SwitchableMutex<T> {
    inner: Inner<T>,
}

// SAFETY: only one guard can exist at a time in either mode.
unsafe impl<T: Send> Sync for SwitchableMutex<T> {}

impl<T> SwitchableMutex<T> {
    /// Wraps `value` using the strategy selected by `safety`.
    pub fn new(value: T, safety: Safety) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(?safety, "creating switchable mutex");
        let inner = match safety {
            Safety::Unsync => Inner::Unsync {
                borrow: BorrowFlag::new(),
                value: UnsafeCell::new(value),
            },
            Safety::Concurrent => Inner::Concurrent(Mutex::new(value)),
        };
        Self { inner }
    }

    /// The mode this mutex was built with.
    #[inline]
    pub fn safety(&self) -> Safety {
        match self.inner {
            Inner::Unsync { .. } => Safety::Unsync,
            Inner::Concurrent(_) => Safety::Concurrent,
        }
    }

    /// Returns `true` if this mutex synchronizes across threads.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.safety().is_concurrent()
    }

    /// Acquires the mutex.
    ///
    /// # Panics
    ///
    /// In unsync mode, panics if a guard is already outstanding.
    #[inline]
    pub fn lock(&self) -> SwitchableMutexGuard<'_, T> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.exclusive();
                // SAFETY: the exclusive borrow excludes every other guard.
                GuardInner::Unsync {
                    value: unsafe { &mut *value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(mutex) => GuardInner::Concurrent(recover(mutex.lock())),
        };
        SwitchableMutexGuard { inner }
    }

    /// Attempts to acquire the mutex without waiting.
    pub fn try_lock(&self) -> Option<SwitchableMutexGuard<'_, T>> {
        let inner = match &self.inner {
            Inner::Unsync { borrow, value } => {
                let borrow = borrow.try_exclusive()?;
                // SAFETY: the exclusive borrow excludes every other guard.
                GuardInner::Unsync {
                    value: unsafe { &mut *value.get() },
                    _borrow: borrow,
                }
            }
            Inner::Concurrent(mutex) => match mutex.try_lock() {
                Ok(guard) => GuardInner::Concurrent(guard),
                Err(TryLockError::Poisoned(poisoned)) => {
                    GuardInner::Concurrent(recover(Err(poisoned)))
                }
                Err(TryLockError::WouldBlock) => return None,
            },
        };
        Some(SwitchableMutexGuard { inner })
    }

    /// Consumes the mutex and returns the wrapped value.
    pub fn into_inner(self) -> T {
        match self.inner {
            Inner::Unsync { value, .. } => value.into_inner(),
            Inner::Concurrent(mutex) => recover(mutex.into_inner()),
        }
    }
}

fn recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(|poisoned| {
        #[cfg(feature = "tracing")]
        tracing::warn!("recovering poisoned mutex");
        poisoned.into_inner()
    })
}

impl<T: Default> Default for SwitchableMutex<T> {
    fn default() -> Self {
        Self::new(T::default(), Safety::Unsync)
    }
}

impl<T> core::fmt::Debug for SwitchableMutex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwitchableMutex")
            .field("safety", &self.safety())
            .finish_non_exhaustive()
    }
}

enum GuardInner<'a, T> {
    Unsync {
        value: &'a mut T,
        _borrow: ExclusiveBorrow<'a>,
    },
    Concurrent(MutexGuard<'a, T>),
}

/// Exclusive access to the value of a [`SwitchableMutex`]. Released on drop.
pub struct SwitchableMutexGuard<'a, T> {
    inner: GuardInner<'a, T>,
}

impl<T> Deref for SwitchableMutexGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        match &self.inner {
            GuardInner::Unsync { value, .. } => value,
            GuardInner::Concurrent(guard) => guard,
        }
    }
}

impl<T> DerefMut for SwitchableMutexGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            GuardInner::Unsync { value, .. } => value,
            GuardInner::Concurrent(guard) => guard,
        }
    }
}
