//! `Array`: an ordered, index-addressable, growable sequence.
//!
//! Elements live in a `VecDeque` behind a [`SwitchableRwLock`], so removing or
//! pushing at either end is O(1) while interior inserts and removals shift the
//! tail in O(n). Every public method takes the guard exactly once: in
//! [`Safety::Concurrent`] mode each call is atomic with respect to other calls
//! on the same array, but a sequence of calls is not.
//!
//! Anything handed back to the caller (`get`, `to_vec`, `sub_slice`, `chunk`)
//! is an independent copy; the backing storage is never aliased.

use crate::concurrency::sync::{read_pair, SwitchableRwLock};
use crate::{IndexOutOfRange, Safety};
use core::cmp::Ordering;
use core::hash::Hash;
use core::ops::ControlFlow;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashSet, VecDeque};

/// A dynamic array with an optional concurrency-safe mode.
///
/// # Examples
///
/// ```
/// use dualmode::Array;
///
/// let array = Array::from_iter([2, 3, 1, 2, 1, 4]);
/// array.unique();
/// assert_eq!(array.to_vec(), [2, 3, 1, 4]);
/// assert_eq!(array.sub_slice(-2, None), Some(vec![1, 4]));
/// assert_eq!(array.to_string(), "[2 3 1 4]");
/// ```
pub struct Array<T> {
    data: SwitchableRwLock<VecDeque<T>>,
}

impl<T> Array<T> {
    /// Creates an empty, unsynchronized array.
    pub fn new() -> Self {
        Self::with_safety(Safety::Unsync)
    }

    /// Creates an empty array that may be shared between threads.
    pub fn new_concurrent() -> Self {
        Self::with_safety(Safety::Concurrent)
    }

    /// Creates an empty array in the given mode.
    pub fn with_safety(safety: Safety) -> Self {
        Self::from_deque(VecDeque::new(), safety)
    }

    /// Adopts `values` as the array's storage without copying.
    pub fn from_vec(values: Vec<T>, safety: Safety) -> Self {
        Self::from_deque(values.into(), safety)
    }

    fn from_deque(data: VecDeque<T>, safety: Safety) -> Self {
        Self {
            data: SwitchableRwLock::new(data, safety),
        }
    }

    /// The mode this array was built with.
    #[inline]
    pub fn safety(&self) -> Safety {
        self.data.safety()
    }

    /// Returns `true` if this array synchronizes across threads.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.data.is_safe()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Replaces the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `index >= len`.
    pub fn set(&self, index: usize, value: T) -> Result<(), IndexOutOfRange> {
        let mut data = self.data.write();
        let len = data.len();
        match data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(IndexOutOfRange::new(index, len)),
        }
    }

    /// Inserts `value` so that it ends up at `index`, shifting the old
    /// element at `index` and everything after it one position right.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `index >= len`.
    pub fn insert_before(&self, index: usize, value: T) -> Result<(), IndexOutOfRange> {
        let mut data = self.data.write();
        if index >= data.len() {
            return Err(IndexOutOfRange::new(index, data.len()));
        }
        data.insert(index, value);
        Ok(())
    }

    /// Inserts `value` directly after the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `index >= len`.
    pub fn insert_after(&self, index: usize, value: T) -> Result<(), IndexOutOfRange> {
        let mut data = self.data.write();
        if index >= data.len() {
            return Err(IndexOutOfRange::new(index, data.len()));
        }
        data.insert(index + 1, value);
        Ok(())
    }

    /// Removes and returns the element at `index`, or `None` if out of range.
    ///
    /// The first and last positions are removed in O(1); interior positions
    /// compact the shorter side.
    pub fn remove(&self, index: usize) -> Option<T> {
        let mut data = self.data.write();
        let len = data.len();
        if index >= len {
            None
        } else if index == 0 {
            data.pop_front()
        } else if index == len - 1 {
            data.pop_back()
        } else {
            data.remove(index)
        }
    }

    /// Prepends `values`, keeping their order: pushing `[1, 2]` onto `[3]`
    /// yields `[1, 2, 3]`.
    pub fn push_left<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let mut data = self.data.write();
        data.reserve(values.len());
        for value in values.into_iter().rev() {
            data.push_front(value);
        }
    }

    /// Appends `values` in order.
    pub fn push_right<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.data.write().extend(values);
    }

    /// Alias of [`push_right`](Self::push_right).
    #[inline]
    pub fn append<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.push_right(values);
    }

    /// Removes and returns the first element.
    pub fn pop_left(&self) -> Option<T> {
        self.data.write().pop_front()
    }

    /// Removes and returns the last element.
    pub fn pop_right(&self) -> Option<T> {
        self.data.write().pop_back()
    }

    /// Removes every element and releases the storage.
    pub fn clear(&self) {
        let mut data = self.data.write();
        if !data.is_empty() {
            *data = VecDeque::new();
        }
    }

    /// Reverses the order of the elements in place.
    pub fn reverse(&self) {
        self.data.write().make_contiguous().reverse();
    }

    /// Sorts in place with `compare`. The sort is stable.
    pub fn sort_by<F>(&self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.data.write().make_contiguous().sort_by(compare);
    }

    /// Visits elements in ascending index order until `visitor` breaks.
    ///
    /// The shared guard is held for the whole walk, so `visitor` must not
    /// mutate this array.
    pub fn each<F>(&self, mut visitor: F)
    where
        F: FnMut(usize, &T) -> ControlFlow<()>,
    {
        let data = self.data.read();
        for (index, value) in data.iter().enumerate() {
            if visitor(index, value).is_break() {
                break;
            }
        }
    }
}

impl<T: Ord> Array<T> {
    /// Sorts in ascending order. The sort is stable.
    pub fn sort(&self) {
        self.data.write().make_contiguous().sort();
    }
}

impl<T: Default> Array<T> {
    /// Creates an array of `size` default values with room for at least
    /// `capacity` elements.
    pub fn with_size(size: usize, capacity: usize, safety: Safety) -> Self {
        let mut data = VecDeque::with_capacity(capacity.max(size));
        data.resize_with(size, T::default);
        Self::from_deque(data, safety)
    }
}

impl<T: Clone> Array<T> {
    /// Copies `values` into a new array.
    pub fn from_slice(values: &[T], safety: Safety) -> Self {
        Self::from_deque(values.iter().cloned().collect(), safety)
    }

    /// Returns a copy of the element at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<T> {
        self.data.read().get(index).cloned()
    }

    /// Returns a copy of the first element.
    pub fn first(&self) -> Option<T> {
        self.data.read().front().cloned()
    }

    /// Returns a copy of the last element.
    pub fn last(&self) -> Option<T> {
        self.data.read().back().cloned()
    }

    /// Copies every element, in order, into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().iter().cloned().collect()
    }

    /// Copies a window of the array.
    ///
    /// - A non-negative `offset` counts from the start; a negative one counts
    ///   back from the end.
    /// - `length` of `None` takes everything from `offset` to the end; a
    ///   positive length takes up to that many elements; a negative length
    ///   takes `|length|` elements ending just before `offset`.
    /// - A window that would start before index 0, or an `offset` past the
    ///   end, yields `None`. A window running past the end is clipped.
    ///
    /// ```
    /// use dualmode::Array;
    ///
    /// let array = Array::from_iter([1, 2, 3]);
    /// assert_eq!(array.sub_slice(1, Some(-1)), Some(vec![1]));
    /// assert_eq!(array.sub_slice(3, Some(1)), Some(vec![]));
    /// assert_eq!(array.sub_slice(-4, Some(1)), None);
    /// ```
    pub fn sub_slice(&self, offset: isize, length: Option<isize>) -> Option<Vec<T>> {
        let data = self.data.read();
        let (start, count) = window(data.len(), offset, length)?;
        Some(data.range(start..start + count).cloned().collect())
    }

    /// Splits the array into consecutive chunks of `size` elements; the last
    /// chunk may be shorter. Returns `None` when `size` is zero.
    pub fn chunk(&self, size: usize) -> Option<Vec<Vec<T>>> {
        if size < 1 {
            return None;
        }
        let data = self.data.read();
        let mut chunks = Vec::with_capacity(data.len().div_ceil(size));
        let mut values = data.iter().cloned();
        loop {
            let chunk: Vec<T> = values.by_ref().take(size).collect();
            if chunk.is_empty() {
                break;
            }
            chunks.push(chunk);
        }
        Some(chunks)
    }

    /// Writes `count` copies of `value` starting at `start`, overwriting
    /// existing positions and extending the array past its end as needed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `start > len`.
    pub fn fill(&self, start: usize, count: usize, value: T) -> Result<(), IndexOutOfRange> {
        let mut data = self.data.write();
        let len = data.len();
        if start > len {
            return Err(IndexOutOfRange::new(start, len));
        }
        let end = start.saturating_add(count);
        let overwrite_end = end.min(len);
        for slot in data.range_mut(start..overwrite_end) {
            slot.clone_from(&value);
        }
        data.extend(core::iter::repeat(value).take(end - overwrite_end));
        Ok(())
    }
}

impl<T: Clone + Default> Array<T> {
    /// Returns a copy of the element at `index`, or `T::default()` if out of
    /// range.
    pub fn get_or_default(&self, index: usize) -> T {
        self.get(index).unwrap_or_default()
    }
}

impl<T: PartialEq> Array<T> {
    /// Returns `true` if an element equal to `value` exists.
    pub fn contains(&self, value: &T) -> bool {
        self.search(value).is_some()
    }

    /// Index of the first element equal to `value`.
    pub fn search(&self, value: &T) -> Option<usize> {
        self.data.read().iter().position(|v| v == value)
    }

    /// Removes the first element equal to `value`. Returns whether one was
    /// removed.
    pub fn remove_value(&self, value: &T) -> bool {
        let mut data = self.data.write();
        match data.iter().position(|v| v == value) {
            Some(index) => {
                data.remove(index);
                true
            }
            None => false,
        }
    }
}

impl<T: Eq + Hash> Array<T> {
    /// Drops every element equal to an earlier one, keeping the relative order
    /// of first occurrences: `[2, 3, 1, 2, 1, 4]` becomes `[2, 3, 1, 4]`.
    pub fn unique(&self) {
        let mut data = self.data.write();
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(data.len());
            data.iter().map(|value| seen.insert(value)).collect()
        };
        let mut keep = keep.into_iter();
        data.retain(|_| keep.next().unwrap_or(false));
    }
}

/// Resolves a signed `offset`/`length` pair against `len` into a clipped
/// `(start, count)` window.
fn window(len: usize, offset: isize, length: Option<isize>) -> Option<(usize, usize)> {
    let len = isize::try_from(len).unwrap_or(isize::MAX);
    if offset > len {
        return None;
    }
    let mut offset = if offset < 0 { len + offset } else { offset };
    if offset < 0 {
        return None;
    }
    let mut size = length.unwrap_or(len);
    if size < 0 {
        offset += size;
        if offset < 0 {
            return None;
        }
        size = -size;
    }
    let size = size.min(len - offset);
    // Both values are non-negative here.
    Some((offset.unsigned_abs(), size.unsigned_abs()))
}

impl<T: Clone> Clone for Array<T> {
    /// Copies the contents into a new array with the same mode.
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        let (a, b) = read_pair(&self.data, &other.data);
        *a == *b
    }
}

impl<T: Eq> Eq for Array<T> {}

impl<T> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_deque(iter.into_iter().collect(), Safety::Unsync)
    }
}

impl<T> Extend<T> for Array<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.push_right(iter);
    }
}

impl<T> From<Vec<T>> for Array<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values, Safety::Unsync)
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Array")
            .field("safety", &self.safety())
            .field("data", &*self.data.read())
            .finish()
    }
}

impl<T: core::fmt::Display> core::fmt::Display for Array<T> {
    /// Renders elements in order, space separated and bracketed: `[1 2 3]`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let data = self.data.read();
        f.write_str("[")?;
        for (index, value) in data.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

impl<T: Serialize> Serialize for Array<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.read().iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Array<T> {
    /// Deserializes into an unsynchronized array.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}
