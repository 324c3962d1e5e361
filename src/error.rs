//! Error type shared by the index-addressed collections.

/// Returned when an index-based mutation targets a position outside the
/// bounds the operation accepts.
///
/// Lookups never produce this error; they answer `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexOutOfRange {
    /// The rejected index.
    pub index: usize,
    /// Length of the collection at the time of the call.
    pub len: usize,
}

impl IndexOutOfRange {
    #[inline]
    pub(crate) fn new(index: usize, len: usize) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(index, len, "rejected out-of-range index");
        Self { index, len }
    }
}

impl core::fmt::Display for IndexOutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "index {} out of array range {}", self.index, self.len)
    }
}

impl std::error::Error for IndexOutOfRange {}
