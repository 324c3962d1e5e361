//! Sequence collections.

pub mod array;

pub use array::Array;
