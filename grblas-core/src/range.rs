//! Range descriptors for extraction and assignment
//!
//! A `RangeSpec` selects an ordered subset of the indices of one
//! dimension. It is derived from the three optional fields of a slice
//! (start, stop, step) and a default upper bound, and is consumed by
//! range extraction and range assignment. Ranges are half-open: `stop`
//! is never selected.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;
use core::ops::{Bound, RangeBounds};

use crate::error::{Error, Result};

/// Canonical encoding of a selected index subset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeSpec {
    /// Every index in bounds
    All,
    /// Contiguous indices `[start, stop)`
    Range { start: usize, stop: usize },
    /// `start, start + step, ...` while below `stop`
    Stride {
        start: usize,
        step: usize,
        stop: usize,
    },
    /// Explicit index array, duplicates allowed
    #[cfg(feature = "alloc")]
    List(Vec<usize>),
}

impl RangeSpec {
    /// Parse the three optional slice fields against a default upper bound
    ///
    /// All fields unset selects everything; an unset step gives a
    /// contiguous range; a set step gives a strided range. Missing start
    /// defaults to 0 and missing stop to `bound`.
    pub fn parse(
        start: Option<usize>,
        stop: Option<usize>,
        step: Option<usize>,
        bound: usize,
    ) -> Result<Self> {
        let spec = match (start, stop, step) {
            (None, None, None) => RangeSpec::All,
            (start, stop, None) => RangeSpec::Range {
                start: start.unwrap_or(0),
                stop: stop.unwrap_or(bound),
            },
            (_, _, Some(0)) => {
                return Err(Error::InvalidArgument {
                    arg: "step",
                    reason: "step must be non-zero",
                })
            }
            (start, stop, Some(step)) => RangeSpec::Stride {
                start: start.unwrap_or(0),
                step,
                stop: stop.unwrap_or(bound),
            },
        };
        Ok(spec)
    }

    /// Build from Rust range syntax (`..`, `a..b`, `a..=b`, `a..`, `..b`)
    pub fn from_bounds<R: RangeBounds<usize>>(range: R, bound: usize) -> Self {
        let start = match range.start_bound() {
            Bound::Included(&s) => Some(s),
            Bound::Excluded(&s) => Some(s.saturating_add(1)),
            Bound::Unbounded => None,
        };
        let stop = match range.end_bound() {
            Bound::Included(&e) => Some(e.saturating_add(1)),
            Bound::Excluded(&e) => Some(e),
            Bound::Unbounded => None,
        };
        match (start, stop) {
            (None, None) => RangeSpec::All,
            (start, stop) => RangeSpec::Range {
                start: start.unwrap_or(0),
                stop: stop.unwrap_or(bound),
            },
        }
    }

    /// A single index, as a one-element contiguous range
    pub const fn single(index: usize) -> Self {
        RangeSpec::Range {
            start: index,
            stop: index.saturating_add(1),
        }
    }

    pub const fn is_all(&self) -> bool {
        matches!(self, RangeSpec::All)
    }

    /// True when positions can be computed arithmetically (no index table)
    pub const fn is_arithmetic(&self) -> bool {
        #[cfg(feature = "alloc")]
        if let RangeSpec::List(_) = self {
            return false;
        }
        true
    }

    /// Number of selected indices
    pub fn len(&self, bound: usize) -> usize {
        match self {
            RangeSpec::All => bound,
            RangeSpec::Range { start, stop } => stop.saturating_sub(*start),
            RangeSpec::Stride { step: 0, .. } => 0,
            RangeSpec::Stride { start, step, stop } => {
                if stop <= start {
                    0
                } else {
                    (stop - start - 1) / step + 1
                }
            }
            #[cfg(feature = "alloc")]
            RangeSpec::List(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self, bound: usize) -> bool {
        self.len(bound) == 0
    }

    /// Validate that every selected index lies below `bound`
    pub fn validate(&self, bound: usize) -> Result<()> {
        match self {
            RangeSpec::All => Ok(()),
            RangeSpec::Stride { step: 0, .. } => Err(Error::InvalidArgument {
                arg: "step",
                reason: "step must be non-zero",
            }),
            #[cfg(feature = "alloc")]
            RangeSpec::List(indices) => match indices.iter().find(|&&i| i >= bound) {
                Some(&index) => Err(Error::OutOfBounds { index, size: bound }),
                None => Ok(()),
            },
            _ => {
                let len = self.len(bound);
                if len == 0 {
                    return Ok(());
                }
                let last = self.index(len - 1);
                if last >= bound {
                    return Err(Error::OutOfBounds {
                        index: last,
                        size: bound,
                    });
                }
                Ok(())
            }
        }
    }

    /// The `k`-th selected index; `k` must be below `len`
    #[inline]
    pub fn index(&self, k: usize) -> usize {
        match self {
            RangeSpec::All => k,
            RangeSpec::Range { start, .. } => start + k,
            RangeSpec::Stride { start, step, .. } => start + k * step,
            #[cfg(feature = "alloc")]
            RangeSpec::List(indices) => indices[k],
        }
    }

    /// Local position of a source index inside the selection
    ///
    /// For lists with duplicates the last occurrence wins.
    #[inline]
    pub fn position_of(&self, index: usize, bound: usize) -> Option<usize> {
        match self {
            RangeSpec::All => (index < bound).then_some(index),
            RangeSpec::Range { start, stop } => {
                (index >= *start && index < *stop).then(|| index - start)
            }
            RangeSpec::Stride { step: 0, .. } => None,
            RangeSpec::Stride { start, step, stop } => {
                if index < *start || index >= *stop || (index - start) % step != 0 {
                    None
                } else {
                    Some((index - start) / step)
                }
            }
            #[cfg(feature = "alloc")]
            RangeSpec::List(indices) => indices.iter().rposition(|&i| i == index),
        }
    }

    /// Iterate the selected indices in selection order
    pub fn iter(&self, bound: usize) -> RangeIter<'_> {
        RangeIter {
            spec: self,
            next: 0,
            len: self.len(bound),
        }
    }

    /// Materialize the selection as a dense index array
    #[cfg(feature = "alloc")]
    pub fn to_indices(&self, bound: usize) -> Vec<usize> {
        self.iter(bound).collect()
    }
}

#[cfg(feature = "alloc")]
impl From<Vec<usize>> for RangeSpec {
    fn from(indices: Vec<usize>) -> Self {
        RangeSpec::List(indices)
    }
}

impl From<core::ops::Range<usize>> for RangeSpec {
    fn from(range: core::ops::Range<usize>) -> Self {
        RangeSpec::Range {
            start: range.start,
            stop: range.end,
        }
    }
}

impl From<core::ops::RangeFull> for RangeSpec {
    fn from(_: core::ops::RangeFull) -> Self {
        RangeSpec::All
    }
}

/// Iterator over the indices selected by a `RangeSpec`
#[derive(Debug, Clone)]
pub struct RangeIter<'a> {
    spec: &'a RangeSpec,
    next: usize,
    len: usize,
}

impl Iterator for RangeIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.len {
            return None;
        }
        let index = self.spec.index(self.next);
        self.next += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangeIter<'_> {}
