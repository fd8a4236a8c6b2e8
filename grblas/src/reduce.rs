//! Monoid reductions
//!
//! Stored values are folded in fixed-length chunks, each seeded with the
//! monoid identity, and the chunk partials are combined left to right.
//! The chunk length is a constant, independent of `ExecConfig` and of the
//! thread count, so floating-point sums come out the same whether or not
//! rayon runs the chunks.

use grblas_core::{Element, Monoid, Result};
use log::trace;
use rayon::prelude::*;

use crate::config::ExecConfig;
use crate::matrix::Matrix;
use crate::output::{write_vector, VectorOutput};
use crate::vector::Vector;

/// Number of stored values folded into one partial
const REDUCE_CHUNK: usize = 16_384;

/// Deterministic chunked fold of `values` through `monoid`
pub(crate) fn fold_chunked<T: Element>(values: &[T], monoid: Monoid) -> T {
    let parallel = ExecConfig::global().should_parallelize(values.len());
    fold_chunks(values, monoid, REDUCE_CHUNK, parallel)
}

fn fold_chunks<T: Element>(values: &[T], monoid: Monoid, chunk: usize, parallel: bool) -> T {
    if values.len() <= chunk {
        return monoid.fold(values.iter().copied());
    }

    let partials: Vec<T> = if parallel {
        values
            .par_chunks(chunk)
            .map(|c| monoid.fold(c.iter().copied()))
            .collect()
    } else {
        values
            .chunks(chunk)
            .map(|c| monoid.fold(c.iter().copied()))
            .collect()
    };
    monoid.fold(partials)
}

impl<T: Element> Vector<T> {
    /// Fold stored values through the type's default monoid
    pub fn reduce(&self) -> T {
        self.reduce_monoid(T::SCALAR_TYPE.operators().monoid)
    }

    /// Fold stored values through `monoid`; an empty vector yields the
    /// monoid identity
    pub fn reduce_monoid(&self, monoid: Monoid) -> T {
        trace!("reduce {} over nvals={}", monoid.name(), self.nvals());
        fold_chunked(self.values(), monoid)
    }
}

impl<T: Element> Matrix<T> {
    /// Fold every stored value through the type's default monoid
    pub fn reduce(&self) -> T {
        self.reduce_monoid(T::SCALAR_TYPE.operators().monoid)
    }

    pub fn reduce_monoid(&self, monoid: Monoid) -> T {
        trace!("reduce {} over nvals={}", monoid.name(), self.nvals());
        let partials = self.rows().map(|(_, _, vals)| fold_chunked(vals, monoid));
        monoid.fold(partials)
    }

    /// Fold each row into one entry; rows without entries stay absent
    pub fn reduce_rows(&self, monoid: Monoid) -> Result<Vector<T>> {
        let reduce_row = |p: usize| {
            let (row, _, vals) = self.row_at(p);
            (row, fold_chunked(vals, monoid))
        };
        let entries: Vec<(usize, T)> = if ExecConfig::global().should_parallelize(self.nvals()) {
            (0..self.stored_rows()).into_par_iter().map(reduce_row).collect()
        } else {
            (0..self.stored_rows()).map(reduce_row).collect()
        };
        let (indices, values): (Vec<usize>, Vec<T>) = entries.into_iter().unzip();
        Ok(Vector::from_sorted_parts(self.nrows(), indices, values))
    }

    /// Row reduction written into `out`; `transpose_a` reduces columns
    pub fn reduce_rows_into(
        &self,
        monoid: Monoid,
        out: &mut Vector<T>,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let result = if ctl.desc.transpose_a {
            self.transpose()?.reduce_rows(monoid)?
        } else {
            self.reduce_rows(monoid)?
        };
        write_vector(out, result, ctl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::with_global;
    use crate::descriptor::Descriptor;
    use proptest::prelude::*;

    #[test]
    fn test_default_monoids() {
        let ints = Vector::from_coordinates(&[0, 3, 4], &[2i64, 5, -1], Some(6)).unwrap();
        assert_eq!(ints.reduce(), 6);
        let floats = Vector::from_list(&[0.5f64, 0.25]).unwrap();
        assert_eq!(floats.reduce(), 0.75);
        let flags = Vector::from_coordinates(&[1], &[true], Some(3)).unwrap();
        assert!(flags.reduce());
        assert!(!Vector::<bool>::new(3).unwrap().reduce());
    }

    #[test]
    fn test_other_monoids() {
        let v = Vector::from_list(&[3i32, -7, 4]).unwrap();
        assert_eq!(v.reduce_monoid(Monoid::Min), -7);
        assert_eq!(v.reduce_monoid(Monoid::Max), 4);
        assert_eq!(v.reduce_monoid(Monoid::Times), -84);
    }

    #[test]
    fn test_empty_reduces_to_identity() {
        let v = Vector::<f64>::new(10).unwrap();
        assert_eq!(v.reduce_monoid(Monoid::Min), f64::INFINITY);
        assert_eq!(v.reduce_monoid(Monoid::Times), 1.0);
        let m = Matrix::<u32>::new(4, 4).unwrap();
        assert_eq!(m.reduce(), 0);
        assert_eq!(m.reduce_monoid(Monoid::Min), u32::MAX);
    }

    #[test]
    fn test_matrix_reductions() {
        let m = Matrix::from_edge_list(&[0, 0, 2], &[0, 2, 1], &[1i64, 2, 5], Some(3), Some(3))
            .unwrap();
        assert_eq!(m.reduce(), 8);
        let rows = m.reduce_rows(Monoid::Plus).unwrap();
        assert_eq!(rows.iter().collect::<Vec<_>>(), vec![(0, 3), (2, 5)]);

        let mut cols = Vector::new(3).unwrap();
        let ctl = VectorOutput::new().with_desc(Descriptor::t0());
        m.reduce_rows_into(Monoid::Max, &mut cols, &ctl).unwrap();
        assert_eq!(cols.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 5), (2, 2)]);
    }

    #[test]
    fn test_chunked_fold_matches_plain_fold() {
        let values: Vec<i64> = (0..100_000).map(|i| i % 13 - 6).collect();
        assert_eq!(fold_chunked(&values, Monoid::Plus), values.iter().sum::<i64>());
        assert_eq!(fold_chunked(&values, Monoid::Min), -6);
    }

    #[test]
    fn test_float_fold_ignores_scheduling() {
        let cancelling = [1.0f64, 1e16, -1e16, 1.0];
        assert_eq!(Vector::from_list(&cancelling).unwrap().reduce(), 1.0);
        assert_eq!(
            fold_chunks(&cancelling, Monoid::Plus, 2, true),
            fold_chunks(&cancelling, Monoid::Plus, 2, false)
        );

        let values: Vec<f64> = (0..3 * REDUCE_CHUNK + 17)
            .map(|i| if i % 3 == 0 { 1e16 } else { 0.1 * (i % 7) as f64 - 0.3 })
            .collect();
        let v = Vector::from_list(&values).unwrap();
        let seq = with_global(ExecConfig::sequential(), || v.reduce());
        let par = with_global(ExecConfig::with_parallel_threshold(1), || v.reduce());
        assert_eq!(seq.to_bits(), par.to_bits());
    }

    proptest! {
        #[test]
        fn prop_empty_reduce_is_identity(size in 0usize..100) {
            let v = Vector::<i64>::new(size).unwrap();
            for monoid in [Monoid::Plus, Monoid::Times, Monoid::Min, Monoid::Max] {
                prop_assert_eq!(v.reduce_monoid(monoid), monoid.identity::<i64>());
            }
        }
    }
}
