//! # `dualmode` - Collections With a Switchable Guard
//!
//! A generic dynamic [`Array`], a hash-backed [`Set`] and a [`Stack`] built on
//! the array. Each collection is built either for single-threaded use or for
//! sharing across threads, and keeps that choice for its whole lifetime.
//!
//! ## Architecture
//!
//! Every collection stores its contents behind one
//! [`SwitchableRwLock`](concurrency::sync::SwitchableRwLock). The
//! [`Safety`] given at construction selects its strategy once:
//!
//! 1. **[`Safety::Unsync`]** (the default):
//!    - No synchronization; acquiring the guard only bumps a borrow counter
//!    - A conflicting acquisition (re-entrancy, or cross-thread use) panics
//!      instead of racing
//!
//! 2. **[`Safety::Concurrent`]**:
//!    - A real reader-writer lock around every public operation
//!    - Each call is atomic with respect to other calls on the same instance;
//!      a sequence of calls is not
//!
//! Collections derived from another one (clones, set algebra results) inherit
//! its mode. Values handed back to callers are always copies, so nothing
//! outside the guard can reach the backing storage.
//!
//! ## Errors
//!
//! Only index-based mutations can fail, with [`IndexOutOfRange`]. Lookups on
//! missing positions, pops on empty collections and invalid windows or chunk
//! sizes answer `None` instead.
//!
//! ## Example
//!
//! ```rust
//! use dualmode::{Array, Safety, Set, Stack};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let set = Arc::new(Set::with_safety(Safety::Concurrent));
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let set = Arc::clone(&set);
//!         thread::spawn(move || set.add((0..100).map(|i| t * 100 + i)))
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(set.len(), 400);
//!
//! let array = Array::from_iter([1, 2, 3]);
//! assert_eq!(array.sub_slice(-1, Some(1)), Some(vec![3]));
//!
//! let stack = Stack::new();
//! stack.push("a");
//! assert_eq!(stack.pop(), Some("a"));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collections;
pub mod concurrency;
pub mod error;
pub mod safety;

pub use collections::{Array, Set, Stack};
pub use error::IndexOutOfRange;
pub use safety::Safety;

// Compile-time assertions for layout and thread-safety claims.
const _: () = {
    use core::mem;

    assert!(mem::size_of::<Safety>() == 1);
    assert!(mem::size_of::<IndexOutOfRange>() == 2 * mem::size_of::<usize>());
};

#[cfg(not(loom))]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Array<u64>>();
    assert_send_sync::<Set<u64>>();
    assert_send_sync::<Stack<u64>>();
    assert_send_sync::<concurrency::sync::SwitchableMutex<u64>>();
};
