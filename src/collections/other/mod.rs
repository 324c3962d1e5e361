//! Collections layered on top of the others.

pub mod stack;

pub use stack::Stack;
