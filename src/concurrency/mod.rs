//! Concurrency support for the collections.
//!
//! The collections do not schedule or batch anything. Every public operation
//! runs to completion under one acquisition of its container's guard; see
//! [`sync`] for the guards themselves.

pub mod sync;
