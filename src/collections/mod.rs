//! The collections, organized by backing storage:
//! - `vec`: index-addressed sequences
//! - `hash`: hash-based membership
//! - `other`: facades built on the above

pub mod hash;
pub mod other;
pub mod vec;

pub use hash::Set;
pub use other::Stack;
pub use vec::Array;
