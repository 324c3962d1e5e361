//! Locking primitives whose synchronization can be switched off.
//!
//! Both primitives take a [`Safety`](crate::Safety) at construction and keep
//! it for their whole lifetime.

mod borrow;
pub mod mutex;
pub mod rwlock;

pub use mutex::{SwitchableMutex, SwitchableMutexGuard};
pub use rwlock::{ReadGuard, SwitchableRwLock, WriteGuard};

pub(crate) use rwlock::read_pair;

#[cfg(all(test, not(loom)))]
mod tests;
