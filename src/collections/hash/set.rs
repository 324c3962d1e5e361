//! `Set`: an unordered collection of unique values.
//!
//! Membership is a `HashSet` behind a [`SwitchableRwLock`]. Set algebra
//! (`union`, `diff`, `intersect`) always builds a fresh set in the receiver's
//! mode; operands are read one at a time and released before the next.
//!
//! Operands are passed as anything convertible to `Option<&Set<T>>`, so a
//! caller holding optional sets can forward them directly. An absent operand
//! is skipped by `union` and `diff` but empties the result of `intersect`.

use crate::concurrency::sync::{read_pair, SwitchableRwLock};
use crate::Safety;
use core::borrow::Borrow;
use core::hash::Hash;
use core::ops::ControlFlow;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// A hash set with an optional concurrency-safe mode.
///
/// # Examples
///
/// ```
/// use dualmode::Set;
///
/// let a = Set::from_iter([1, 2, 3]);
/// let b = Set::from_iter([3, 4]);
/// assert_eq!(a.union([&b]).to_string(), "[1 2 3 4]");
/// assert_eq!(a.intersect([&b]).to_vec(), [3]);
/// assert!(a.intersect([None::<&Set<i32>>]).is_empty());
/// ```
pub struct Set<T> {
    data: SwitchableRwLock<HashSet<T>>,
}

impl<T> Set<T> {
    /// Creates an empty, unsynchronized set.
    pub fn new() -> Self {
        Self::with_safety(Safety::Unsync)
    }

    /// Creates an empty set that may be shared between threads.
    pub fn new_concurrent() -> Self {
        Self::with_safety(Safety::Concurrent)
    }

    /// Creates an empty set in the given mode.
    pub fn with_safety(safety: Safety) -> Self {
        Self::from_members(HashSet::new(), safety)
    }

    fn from_members(members: HashSet<T>, safety: Safety) -> Self {
        Self {
            data: SwitchableRwLock::new(members, safety),
        }
    }

    /// The mode this set was built with.
    #[inline]
    pub fn safety(&self) -> Safety {
        self.data.safety()
    }

    /// Returns `true` if this set synchronizes across threads.
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.data.is_safe()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Removes every member.
    pub fn clear(&self) {
        *self.data.write() = HashSet::new();
    }

    /// Visits members in no particular order until `visitor` breaks.
    ///
    /// In concurrent mode the exclusive guard is held for the whole walk, so
    /// `visitor` must not call back into this set or it deadlocks. In unsync
    /// mode `visitor` may read the set, but mutating it panics.
    pub fn each<F>(&self, visitor: F)
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        if self.is_safe() {
            visit(&self.data.write(), visitor);
        } else {
            visit(&self.data.read(), visitor);
        }
    }
}

fn visit<T, F>(members: &HashSet<T>, mut visitor: F)
where
    F: FnMut(&T) -> ControlFlow<()>,
{
    for member in members {
        if visitor(member).is_break() {
            break;
        }
    }
}

impl<T: Eq + Hash> Set<T> {
    /// Adds `values`; members already present are left as they are.
    pub fn add<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.data.write().extend(values);
    }

    /// Adds a single value. Returns `true` if it was not already present.
    pub fn insert(&self, value: T) -> bool {
        self.data.write().insert(value)
    }

    /// Removes `values`; absent values are ignored.
    pub fn remove<I, Q>(&self, values: I)
    where
        I: IntoIterator<Item = Q>,
        Q: Borrow<T>,
    {
        let mut data = self.data.write();
        for value in values {
            data.remove(value.borrow());
        }
    }

    /// Removes a single value. Returns `true` if it was a member.
    pub fn remove_one(&self, value: &T) -> bool {
        self.data.write().remove(value)
    }

    /// Returns `true` if `value` is a member.
    pub fn contains(&self, value: &T) -> bool {
        self.data.read().contains(value)
    }

    /// Returns `true` if both sets have exactly the same members.
    ///
    /// A set always equals itself; an absent `other` never matches.
    pub fn equal<'a>(&self, other: impl Into<Option<&'a Set<T>>>) -> bool
    where
        T: 'a,
    {
        let Some(other) = other.into() else {
            return false;
        };
        if core::ptr::eq(self, other) {
            return true;
        }
        let (mine, theirs) = read_pair(&self.data, &other.data);
        mine.len() == theirs.len() && mine.iter().all(|member| theirs.contains(member))
    }

    /// Returns `true` if every member of this set is a member of `other`.
    ///
    /// The empty set is a subset of every set and a set is a subset of
    /// itself; an absent `other` yields `false`.
    pub fn is_subset_of<'a>(&self, other: impl Into<Option<&'a Set<T>>>) -> bool
    where
        T: 'a,
    {
        let Some(other) = other.into() else {
            return false;
        };
        if core::ptr::eq(self, other) {
            return true;
        }
        let (mine, theirs) = read_pair(&self.data, &other.data);
        mine.is_subset(&theirs)
    }
}

impl<T: Eq + Hash + Clone> Set<T> {
    /// Copies `values` into a new set, collapsing duplicates.
    pub fn from_slice(values: &[T], safety: Safety) -> Self {
        Self::from_members(values.iter().cloned().collect(), safety)
    }

    /// Copies the members into a `Vec`, in no particular order.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().iter().cloned().collect()
    }

    fn snapshot(&self) -> HashSet<T> {
        self.data.read().clone()
    }

    /// Returns a new set holding the members of this set and of every
    /// present operand.
    pub fn union<'a, I, O>(&self, others: I) -> Set<T>
    where
        I: IntoIterator<Item = O>,
        O: Into<Option<&'a Set<T>>>,
        T: 'a,
    {
        let mut members = self.snapshot();
        for other in others {
            let other: Option<&Set<T>> = other.into();
            if let Some(other) = other {
                members.extend(other.data.read().iter().cloned());
            }
        }
        Self::from_members(members, self.safety())
    }

    /// Returns a new set holding the members of this set that belong to none
    /// of the present operands.
    pub fn diff<'a, I, O>(&self, others: I) -> Set<T>
    where
        I: IntoIterator<Item = O>,
        O: Into<Option<&'a Set<T>>>,
        T: 'a,
    {
        let mut members = self.snapshot();
        for other in others {
            let other: Option<&Set<T>> = other.into();
            if let Some(other) = other {
                let other = other.data.read();
                members.retain(|member| !other.contains(member));
            }
        }
        Self::from_members(members, self.safety())
    }

    /// Returns a new set holding the members common to this set and every
    /// operand. Any absent operand makes the result empty.
    pub fn intersect<'a, I, O>(&self, others: I) -> Set<T>
    where
        I: IntoIterator<Item = O>,
        O: Into<Option<&'a Set<T>>>,
        T: 'a,
    {
        let mut members = self.snapshot();
        for other in others {
            let other: Option<&Set<T>> = other.into();
            let Some(other) = other else {
                #[cfg(feature = "tracing")]
                tracing::debug!("intersect with an absent operand, returning an empty set");
                return Self::with_safety(self.safety());
            };
            let other = other.data.read();
            members.retain(|member| other.contains(member));
        }
        Self::from_members(members, self.safety())
    }
}

impl<T: Clone> Clone for Set<T> {
    /// Copies the members into a new set with the same mode.
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> PartialEq for Set<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl<T: Eq + Hash> Eq for Set<T> {}

impl<T: Eq + Hash> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_members(iter.into_iter().collect(), Safety::Unsync)
    }
}

impl<T: Eq + Hash> Extend<T> for Set<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add(iter);
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Set<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Set")
            .field("safety", &self.safety())
            .field("data", &*self.data.read())
            .finish()
    }
}

impl<T: core::fmt::Display> core::fmt::Display for Set<T> {
    /// Renders members sorted by their text form: `[a b c]`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut rendered: Vec<String> = self.data.read().iter().map(ToString::to_string).collect();
        rendered.sort_unstable();
        write!(f, "[{}]", rendered.join(" "))
    }
}

impl<T: Serialize> Serialize for Set<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.read().iter())
    }
}

impl<'de, T: Deserialize<'de> + Eq + Hash> Deserialize<'de> for Set<T> {
    /// Deserializes any sequence into an unsynchronized set; duplicates
    /// collapse.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        HashSet::<T>::deserialize(deserializer)
            .map(|members| Self::from_members(members, Safety::Unsync))
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    fn sorted(set: &Set<i32>) -> Vec<i32> {
        let mut members = set.to_vec();
        members.sort_unstable();
        members
    }

    #[test]
    fn add_and_remove_are_idempotent() {
        let set = Set::new();
        set.add([1, 2, 2, 3]);
        set.add([3]);
        assert_eq!(set.len(), 3);
        set.remove([2, 9]);
        set.remove([&2]);
        assert_eq!(sorted(&set), [1, 3]);
        assert!(!set.insert(1));
        assert!(set.insert(4));
        assert!(set.remove_one(&4));
        assert!(!set.remove_one(&4));
    }

    #[test]
    fn absent_operands() {
        let a = Set::from_iter([1, 2]);
        let b = Set::from_iter([2, 3]);
        let none: Option<&Set<i32>> = None;

        assert_eq!(sorted(&a.union([Some(&b), none])), [1, 2, 3]);
        assert_eq!(sorted(&a.diff([none, Some(&b)])), [1]);
        assert!(a.intersect([Some(&b), none]).is_empty());
        assert!(!a.equal(none));
        assert!(!a.is_subset_of(none));
    }

    #[test]
    fn derived_sets_keep_mode() {
        let a = Set::from_slice(&[1, 2], Safety::Concurrent);
        let b = Set::from_iter([2]);
        assert!(a.union([&b]).is_safe());
        assert!(a.diff([&b]).is_safe());
        assert!(a.intersect([None::<&Set<i32>>]).is_safe());
        assert!(a.clone().is_safe());
        assert!(!b.intersect([&a]).is_safe());
    }

    #[test]
    fn self_comparisons() {
        let a = Set::from_slice(&[1, 2], Safety::Concurrent);
        assert!(a.equal(&a));
        assert!(a.is_subset_of(&a));
        assert!(a.diff([&a]).is_empty());
        assert_eq!(a.union([&a]), a);
    }

    #[test]
    fn display_is_sorted_by_text() {
        let set = Set::from_iter([10, 9, 100]);
        assert_eq!(set.to_string(), "[10 100 9]");
        assert_eq!(Set::<i32>::new().to_string(), "[]");
    }

    #[test]
    fn each_can_stop_early() {
        let set = Set::from_iter(0..10);
        let mut visited = 0;
        set.each(|_| {
            visited += 1;
            if visited == 4 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 4);
    }

    #[test]
    fn unsync_each_allows_reads_of_the_same_set() {
        let set = Set::from_iter([1, 2]);
        let mut found = 0;
        set.each(|member| {
            if set.contains(member) && set.len() == 2 {
                found += 1;
            }
            ControlFlow::Continue(())
        });
        assert_eq!(found, 2);
        assert_eq!(set.to_string(), "[1 2]");
    }

    #[test]
    #[should_panic(expected = "unsynchronized collection")]
    fn unsync_each_rejects_mutation_of_the_same_set() {
        let set = Set::from_iter([1, 2]);
        set.each(|member| {
            set.add([member + 10]);
            ControlFlow::Continue(())
        });
    }

    #[test]
    fn concurrent_each_holds_the_exclusive_guard() {
        let set = Set::from_slice(&[1], Safety::Concurrent);
        set.each(|_| {
            assert!(set.data.try_read().is_none());
            ControlFlow::Continue(())
        });
        assert!(set.data.try_read().is_some());
    }

    #[test]
    fn serde_collapses_duplicates() {
        let set: Set<i32> = serde_json::from_str("[1,1,2]").unwrap();
        assert_eq!(sorted(&set), [1, 2]);
        let json = serde_json::to_string(&Set::from_iter([5])).unwrap();
        assert_eq!(json, "[5]");
    }
}
