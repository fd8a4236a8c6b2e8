//! Allocation and bulk-build helpers shared by the containers

use grblas_core::{Error, Result};
use rayon::slice::ParallelSliceMut;

/// Allocate an empty `Vec` with room for `capacity` items, reporting
/// exhaustion as an engine failure instead of aborting
pub(crate) fn try_with_capacity<T>(capacity: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| Error::out_of_memory())?;
    Ok(buf)
}

/// Copy a slice into freshly allocated storage
pub(crate) fn try_to_vec<T: Copy>(items: &[T]) -> Result<Vec<T>> {
    let mut buf = try_with_capacity(items.len())?;
    buf.extend_from_slice(items);
    Ok(buf)
}

/// Sort entries by key and collapse repeated keys, keeping the entry that
/// came last in input order
///
/// The sort is stable, so among equal keys the input order survives and
/// the final write wins. Returns the number of collapsed entries.
pub(crate) fn sort_dedup_last<K, V>(entries: &mut Vec<(K, V)>, parallel: bool) -> usize
where
    K: Ord + Copy + Send,
    V: Copy + Send,
{
    if parallel {
        entries.par_sort_by_key(|e| e.0);
    } else {
        entries.sort_by_key(|e| e.0);
    }

    let len = entries.len();
    let mut write = 0;
    for read in 0..len {
        if write > 0 && entries[write - 1].0 == entries[read].0 {
            entries[write - 1] = entries[read];
        } else {
            entries[write] = entries[read];
            write += 1;
        }
    }
    entries.truncate(write);
    len - write
}
