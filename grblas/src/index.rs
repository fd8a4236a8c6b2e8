//! Validated range selections
//!
//! A `Selection` binds a `RangeSpec` to the dimension it addresses and
//! answers the two questions extraction and assignment ask: which source
//! index sits at local position `k`, and which local position (if any)
//! a source index maps to. Arithmetic forms answer both in O(1); list
//! forms keep a hash table from index to its last list position.

use grblas_core::{Element, RangeSpec, Result};
use hashbrown::HashMap;

use crate::storage::try_with_capacity;

pub(crate) struct Selection<'a> {
    spec: &'a RangeSpec,
    bound: usize,
    len: usize,
    lookup: Option<HashMap<usize, usize>>,
}

impl<'a> Selection<'a> {
    /// Validate `spec` against a dimension of size `bound`
    pub(crate) fn new(spec: &'a RangeSpec, bound: usize) -> Result<Self> {
        spec.validate(bound)?;
        let lookup = match spec {
            RangeSpec::List(indices) => {
                let mut map = HashMap::with_capacity(indices.len());
                // later positions overwrite earlier ones
                for (k, &i) in indices.iter().enumerate() {
                    map.insert(i, k);
                }
                Some(map)
            }
            _ => None,
        };
        Ok(Self {
            spec,
            bound,
            len: spec.len(bound),
            lookup,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Source index at local position `k`
    #[inline]
    pub(crate) fn index(&self, k: usize) -> usize {
        self.spec.index(k)
    }

    /// Local position of a source index; the last one for repeated list
    /// entries
    #[inline]
    pub(crate) fn position_of(&self, index: usize) -> Option<usize> {
        match &self.lookup {
            Some(map) => map.get(&index).copied(),
            None => self.spec.position_of(index, self.bound),
        }
    }

    #[inline]
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.position_of(index).is_some()
    }

    /// Entries of a sorted sparse run that fall in the selection,
    /// re-keyed by local position and sorted by it
    pub(crate) fn gather<T: Element>(
        &self,
        idx: &[usize],
        vals: &[T],
    ) -> Result<(Vec<usize>, Vec<T>)> {
        match self.spec {
            RangeSpec::List(list) => {
                let mut out_idx = try_with_capacity(list.len().min(idx.len()))?;
                let mut out_val = try_with_capacity(list.len().min(idx.len()))?;
                for (k, src) in list.iter().enumerate() {
                    if let Ok(p) = idx.binary_search(src) {
                        out_idx.push(k);
                        out_val.push(vals[p]);
                    }
                }
                Ok((out_idx, out_val))
            }
            _ => {
                let (lo, hi) = self.window(idx);
                let mut out_idx = try_with_capacity(hi - lo)?;
                let mut out_val = try_with_capacity(hi - lo)?;
                for p in lo..hi {
                    if let Some(k) = self.spec.position_of(idx[p], self.bound) {
                        out_idx.push(k);
                        out_val.push(vals[p]);
                    }
                }
                Ok((out_idx, out_val))
            }
        }
    }

    /// Slice bounds of a sorted run that can hold selected indices
    fn window(&self, idx: &[usize]) -> (usize, usize) {
        match *self.spec {
            RangeSpec::Range { start, stop } | RangeSpec::Stride { start, stop, .. } => {
                let lo = idx.partition_point(|&i| i < start);
                let hi = idx.partition_point(|&i| i < stop).max(lo);
                (lo, hi)
            }
            _ => (0, idx.len()),
        }
    }

    /// Map local entries to target indices, sorted by target
    ///
    /// For repeated list indices only the entry at the last list position
    /// survives.
    pub(crate) fn scatter<T: Element>(
        &self,
        local_idx: &[usize],
        local_val: &[T],
    ) -> Result<(Vec<usize>, Vec<T>)> {
        let mut entries: Vec<(usize, T)> = try_with_capacity(local_idx.len())?;
        for (&k, &v) in local_idx.iter().zip(local_val) {
            let target = self.index(k);
            if self.position_of(target) == Some(k) {
                entries.push((target, v));
            }
        }
        if !self.spec.is_arithmetic() {
            entries.sort_unstable_by_key(|e| e.0);
        }
        Ok(entries.into_iter().unzip())
    }

    /// Every selected target index once, ascending
    pub(crate) fn targets(&self) -> Result<Vec<usize>> {
        let mut targets = try_with_capacity(self.len)?;
        targets.extend(self.spec.iter(self.bound));
        if !self.spec.is_arithmetic() {
            targets.sort_unstable();
            targets.dedup();
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_stride() {
        let spec = RangeSpec::Stride {
            start: 1,
            step: 2,
            stop: 8,
        };
        let sel = Selection::new(&spec, 10).unwrap();
        assert_eq!(sel.len(), 4);
        let (idx, val) = sel.gather(&[0, 1, 2, 5, 7, 9], &[0, 10, 20, 50, 70, 90]).unwrap();
        assert_eq!(idx, vec![0, 2, 3]);
        assert_eq!(val, vec![10, 50, 70]);
    }

    #[test]
    fn test_gather_list_with_repeats() {
        let spec = RangeSpec::List(vec![5, 0, 5, 3]);
        let sel = Selection::new(&spec, 6).unwrap();
        let (idx, val) = sel.gather(&[0, 5], &[1i64, 2]).unwrap();
        assert_eq!(idx, vec![0, 1, 2]);
        assert_eq!(val, vec![2, 1, 2]);
    }

    #[test]
    fn test_scatter_list_last_wins() {
        let spec = RangeSpec::List(vec![4, 1, 4]);
        let sel = Selection::new(&spec, 6).unwrap();
        assert_eq!(sel.position_of(4), Some(2));
        let (idx, val) = sel.scatter(&[0, 1, 2], &[7i64, 8, 9]).unwrap();
        assert_eq!(idx, vec![1, 4]);
        assert_eq!(val, vec![8, 9]);
        assert_eq!(sel.targets().unwrap(), vec![1, 4]);
    }

    #[test]
    fn test_invalid_selection() {
        let spec = RangeSpec::Range { start: 0, stop: 11 };
        assert!(Selection::new(&spec, 10).is_err());
    }
}
