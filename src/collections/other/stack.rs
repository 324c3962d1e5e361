//! `Stack`: a LIFO facade over [`Array`].
//!
//! The top of the stack is the array's right end, so `push` and `pop` are
//! both O(1). The stack owns its array outright and has no state of its own.

use crate::collections::vec::Array;
use crate::Safety;
use serde::{Deserialize, Serialize};

/// A last-in, first-out stack with an optional concurrency-safe mode.
///
/// # Examples
///
/// ```
/// use dualmode::Stack;
///
/// let stack = Stack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.peek(), Some(2));
/// assert_eq!(stack.pop(), Some(2));
/// assert_eq!(stack.pop(), Some(1));
/// assert_eq!(stack.pop(), None);
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack<T> {
    data: Array<T>,
}

impl<T> Stack<T> {
    /// Creates an empty, unsynchronized stack.
    pub fn new() -> Self {
        Self::with_safety(Safety::Unsync)
    }

    /// Creates an empty stack that may be shared between threads.
    pub fn new_concurrent() -> Self {
        Self::with_safety(Safety::Concurrent)
    }

    /// Creates an empty stack in the given mode.
    pub fn with_safety(safety: Safety) -> Self {
        Self {
            data: Array::with_safety(safety),
        }
    }

    /// Builds a stack as if every element of `values` had been pushed in
    /// order: the last element ends up on top.
    pub fn from_vec(values: Vec<T>, safety: Safety) -> Self {
        Self {
            data: Array::from_vec(values, safety),
        }
    }

    /// The mode this stack was built with.
    #[inline]
    pub fn safety(&self) -> Safety {
        self.data.safety()
    }

    /// Returns `true` if this stack synchronizes across threads.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.data.is_safe()
    }

    /// Places `value` on top of the stack.
    pub fn push(&self, value: T) {
        self.data.push_right([value]);
    }

    /// Removes and returns the top element.
    pub fn pop(&self) -> Option<T> {
        self.data.pop_right()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the stack holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Clone> Stack<T> {
    /// Returns a copy of the top element without removing it.
    pub fn peek(&self) -> Option<T> {
        self.data.last()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            data: Array::from_iter(iter),
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Stack").field(&self.data).finish()
    }
}

impl<T: core::fmt::Display> core::fmt::Display for Stack<T> {
    /// Renders bottom to top: `[1 2 3]` has 3 on top.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.data, f)
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let stack = Stack::new();
        for value in 1..=3 {
            stack.push(value);
        }
        assert_eq!(stack.len(), 3);
        let popped: Vec<_> = core::iter::from_fn(|| stack.pop()).collect();
        assert_eq!(popped, [3, 2, 1]);
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.peek(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn peek_leaves_top_in_place() {
        let stack = Stack::from_vec(vec![1, 2], Safety::Concurrent);
        assert_eq!(stack.peek(), Some(2));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.to_string(), "[1 2]");
    }

    #[test]
    fn clone_is_deep_and_keeps_mode() {
        let stack = Stack::from_vec(vec![1], Safety::Concurrent);
        let copy = stack.clone();
        copy.push(2);
        assert_eq!(stack.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.safety(), Safety::Concurrent);
        assert!(copy.is_safe());
        assert!(!Stack::<i32>::new().is_safe());
    }

    #[test]
    fn stored_default_is_distinguishable_from_empty() {
        let stack = Stack::new();
        stack.push(0);
        assert_eq!(stack.pop(), Some(0));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn serializes_bottom_to_top() {
        let stack: Stack<i32> = (1..=3).collect();
        assert_eq!(serde_json::to_string(&stack).unwrap(), "[1,2,3]");
        let back: Stack<i32> = serde_json::from_str("[4,5]").unwrap();
        assert_eq!(back.pop(), Some(5));
    }
}
