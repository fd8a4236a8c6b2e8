//! Sorted sparse merge kernels
//!
//! Every container stores its indices sorted, so element-wise combination
//! is a two-pointer walk over two sorted runs. The strategy picks which
//! positions survive: the union keeps positions present in either run and
//! passes single-sided values through unchanged; the intersection keeps
//! positions present in both.

use grblas_core::{Element, Error, Result};
use rayon::prelude::*;

use crate::config::ExecConfig;
use crate::matrix::{Matrix, Row};
use crate::storage::try_with_capacity;
use crate::vector::Vector;

/// Which positions a merge keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Positions stored in either operand
    Union,
    /// Positions stored in both operands
    Intersection,
}

impl MergeStrategy {
    /// Upper bound on the merged length
    fn capacity(self, a: usize, b: usize) -> usize {
        match self {
            MergeStrategy::Union => a + b,
            MergeStrategy::Intersection => a.min(b),
        }
    }
}

/// Merge two sorted index/value runs, appending to `out_idx`/`out_val`
///
/// `op` is only invoked where both runs hold the position, with the
/// first run's value on the left.
pub(crate) fn merge_sorted<T, F>(
    strategy: MergeStrategy,
    a: (&[usize], &[T]),
    b: (&[usize], &[T]),
    op: F,
    out_idx: &mut Vec<usize>,
    out_val: &mut Vec<T>,
) -> Result<()>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    let (a_idx, a_val) = a;
    let (b_idx, b_val) = b;
    let bound = strategy.capacity(a_idx.len(), b_idx.len());
    out_idx
        .try_reserve(bound)
        .map_err(|_| Error::out_of_memory())?;
    out_val
        .try_reserve(bound)
        .map_err(|_| Error::out_of_memory())?;

    let (mut i, mut j) = (0, 0);
    while i < a_idx.len() && j < b_idx.len() {
        match a_idx[i].cmp(&b_idx[j]) {
            core::cmp::Ordering::Less => {
                if strategy == MergeStrategy::Union {
                    out_idx.push(a_idx[i]);
                    out_val.push(a_val[i]);
                }
                i += 1;
            }
            core::cmp::Ordering::Greater => {
                if strategy == MergeStrategy::Union {
                    out_idx.push(b_idx[j]);
                    out_val.push(b_val[j]);
                }
                j += 1;
            }
            core::cmp::Ordering::Equal => {
                out_idx.push(a_idx[i]);
                out_val.push(op(a_val[i], b_val[j]));
                i += 1;
                j += 1;
            }
        }
    }

    if strategy == MergeStrategy::Union {
        out_idx.extend_from_slice(&a_idx[i..]);
        out_val.extend_from_slice(&a_val[i..]);
        out_idx.extend_from_slice(&b_idx[j..]);
        out_val.extend_from_slice(&b_val[j..]);
    }
    Ok(())
}

/// Merge two same-size vectors
pub(crate) fn merge_vectors<T, F>(
    strategy: MergeStrategy,
    a: &Vector<T>,
    b: &Vector<T>,
    op: F,
) -> Result<Vector<T>>
where
    T: Element,
    F: Fn(T, T) -> T,
{
    debug_assert_eq!(a.size(), b.size());
    let (mut idx, mut val) = (Vec::new(), Vec::new());
    merge_sorted(
        strategy,
        (a.indices(), a.values()),
        (b.indices(), b.values()),
        op,
        &mut idx,
        &mut val,
    )?;
    Ok(Vector::from_sorted_parts(a.size(), idx, val))
}

/// Pair up the stored rows of two matrices as `(row, pos_in_a, pos_in_b)`
pub(crate) fn pair_rows(
    strategy: MergeStrategy,
    a: &[usize],
    b: &[usize],
) -> Result<Vec<(usize, Option<usize>, Option<usize>)>> {
    let mut pairs = try_with_capacity(strategy.capacity(a.len(), b.len()))?;
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next_a = a.get(i).copied();
        let next_b = b.get(j).copied();
        match (next_a, next_b) {
            (Some(ra), Some(rb)) if ra == rb => {
                pairs.push((ra, Some(i), Some(j)));
                i += 1;
                j += 1;
            }
            (Some(ra), Some(rb)) if ra < rb => {
                if strategy == MergeStrategy::Union {
                    pairs.push((ra, Some(i), None));
                }
                i += 1;
            }
            (Some(_), Some(rb)) => {
                if strategy == MergeStrategy::Union {
                    pairs.push((rb, None, Some(j)));
                }
                j += 1;
            }
            (Some(ra), None) => {
                if strategy == MergeStrategy::Union {
                    pairs.push((ra, Some(i), None));
                }
                i += 1;
            }
            (None, Some(rb)) => {
                if strategy == MergeStrategy::Union {
                    pairs.push((rb, None, Some(j)));
                }
                j += 1;
            }
            (None, None) => break,
        }
    }
    Ok(pairs)
}

/// Merge two same-shape matrices row by row
///
/// Rows are independent, so large inputs merge rows on the rayon pool;
/// results are collected in row order either way.
pub(crate) fn merge_matrices<T, F>(
    strategy: MergeStrategy,
    a: &Matrix<T>,
    b: &Matrix<T>,
    op: F,
) -> Result<Matrix<T>>
where
    T: Element,
    F: Fn(T, T) -> T + Sync,
{
    debug_assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
    let pairs = pair_rows(strategy, a.row_ids(), b.row_ids())?;
    let empty: (&[usize], &[T]) = (&[], &[]);

    let merge_row = |&(row, pa, pb): &(usize, Option<usize>, Option<usize>)| -> Result<Row<T>> {
        let lhs = pa.map_or(empty, |p| {
            let (_, cols, vals) = a.row_at(p);
            (cols, vals)
        });
        let rhs = pb.map_or(empty, |p| {
            let (_, cols, vals) = b.row_at(p);
            (cols, vals)
        });
        let (mut cols, mut vals) = (Vec::new(), Vec::new());
        merge_sorted(strategy, lhs, rhs, &op, &mut cols, &mut vals)?;
        Ok((row, cols, vals))
    };

    let work = a.nvals() + b.nvals();
    let rows = if ExecConfig::global().should_parallelize(work) {
        pairs.par_iter().map(merge_row).collect::<Result<Vec<_>>>()?
    } else {
        pairs.iter().map(merge_row).collect::<Result<Vec<_>>>()?
    };
    Matrix::from_rows(a.nrows(), a.ncols(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(strategy: MergeStrategy) -> (Vec<usize>, Vec<i64>) {
        let (mut idx, mut val) = (Vec::new(), Vec::new());
        merge_sorted(
            strategy,
            (&[0, 2, 5], &[1, 2, 5]),
            (&[2, 3, 5, 9], &[10, 30, 50, 90]),
            |x, y| x - y,
            &mut idx,
            &mut val,
        )
        .unwrap();
        (idx, val)
    }

    #[test]
    fn test_union_passes_single_sided_values() {
        let (idx, val) = run(MergeStrategy::Union);
        assert_eq!(idx, vec![0, 2, 3, 5, 9]);
        assert_eq!(val, vec![1, -8, 30, -45, 90]);
    }

    #[test]
    fn test_pair_rows() {
        let pairs = pair_rows(MergeStrategy::Union, &[0, 2, 4], &[2, 3]).unwrap();
        assert_eq!(
            pairs,
            vec![
                (0, Some(0), None),
                (2, Some(1), Some(0)),
                (3, None, Some(1)),
                (4, Some(2), None)
            ]
        );
        let pairs = pair_rows(MergeStrategy::Intersection, &[0, 2, 4], &[2, 3]).unwrap();
        assert_eq!(pairs, vec![(2, Some(1), Some(0))]);
    }

    #[test]
    fn test_intersection() {
        let (idx, val) = run(MergeStrategy::Intersection);
        assert_eq!(idx, vec![2, 5]);
        assert_eq!(val, vec![-8, -45]);
    }
}
