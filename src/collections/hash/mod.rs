//! Hash-based collections.

pub mod set;

pub use set::Set;
