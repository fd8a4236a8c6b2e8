//! Semiring multiplication
//!
//! `vxm` treats the vector as a row vector, `mxv` as a column vector, and
//! `mxm` is Gustavson's row-by-row product. An output position exists
//! only when at least one pair of stored operands meets there; absent
//! cells never contribute the semiring zero explicitly.
//!
//! Partial products are accumulated with ⊕ in ascending inner-index
//! order. Row-parallel kernels collect their rows in order, so results
//! never depend on the thread count.

use std::borrow::Cow;

use grblas_core::{Element, Error, Result, Semiring, Shape, SparseShape};
use hashbrown::HashMap;
use log::{debug, trace};
use rayon::prelude::*;

use crate::config::ExecConfig;
use crate::matrix::{Matrix, Row};
use crate::output::{write_matrix, write_vector, MatrixOutput, VectorOutput};
use crate::vector::Vector;

/// Sparse accumulator keyed by output column
struct Spa<T> {
    sums: HashMap<usize, T>,
}

impl<T: Element> Spa<T> {
    fn new() -> Self {
        Self {
            sums: HashMap::new(),
        }
    }

    #[inline]
    fn accumulate(&mut self, sr: Semiring, key: usize, product: T) {
        self.sums
            .entry(key)
            .and_modify(|acc| *acc = sr.add(*acc, product))
            .or_insert(product);
    }

    /// Drain into ascending `(cols, values)`
    fn drain_sorted(&mut self) -> (Vec<usize>, Vec<T>) {
        let mut entries: Vec<(usize, T)> = self.sums.drain().collect();
        entries.sort_unstable_by_key(|e| e.0);
        entries.into_iter().unzip()
    }
}

pub(crate) fn maybe_transposed<T: Element>(
    m: &Matrix<T>,
    transpose: bool,
) -> Result<Cow<'_, Matrix<T>>> {
    if transpose {
        Ok(Cow::Owned(m.transpose()?))
    } else {
        Ok(Cow::Borrowed(m))
    }
}

/// `w = v ⊕.⊗ M`
fn vxm_kernel<T: Element>(v: &Vector<T>, m: &Matrix<T>, sr: Semiring) -> Result<Vector<T>> {
    if v.size() != m.nrows() {
        return Err(Error::ShapeMismatch {
            expected: Shape::Vector(m.nrows()),
            got: v.shape(),
        });
    }
    trace!(
        "vxm {} on {} x {} nvals={}",
        sr,
        v.shape(),
        m.shape(),
        m.nvals()
    );

    let mut spa = Spa::new();
    let rows = m.row_ids();
    let (mut i, mut p) = (0, 0);
    // merge-join the stored vector entries with the stored matrix rows
    while i < v.nvals() && p < rows.len() {
        let vi = v.indices()[i];
        match vi.cmp(&rows[p]) {
            core::cmp::Ordering::Less => i += 1,
            core::cmp::Ordering::Greater => p += 1,
            core::cmp::Ordering::Equal => {
                let x = v.values()[i];
                let (_, cols, vals) = m.row_at(p);
                for (&j, &mij) in cols.iter().zip(vals) {
                    spa.accumulate(sr, j, sr.multiply(x, mij));
                }
                i += 1;
                p += 1;
            }
        }
    }

    let (indices, values) = spa.drain_sorted();
    Ok(Vector::from_sorted_parts(m.ncols(), indices, values))
}

/// Dot product of one sparse row with a sparse vector, `None` when the
/// patterns do not meet
#[inline]
fn row_dot<T: Element>(cols: &[usize], vals: &[T], u: &Vector<T>, sr: Semiring) -> Option<T> {
    let (u_idx, u_val) = (u.indices(), u.values());
    let (mut a, mut b) = (0, 0);
    let mut acc: Option<T> = None;
    while a < cols.len() && b < u_idx.len() {
        match cols[a].cmp(&u_idx[b]) {
            core::cmp::Ordering::Less => a += 1,
            core::cmp::Ordering::Greater => b += 1,
            core::cmp::Ordering::Equal => {
                let product = sr.multiply(vals[a], u_val[b]);
                acc = Some(match acc {
                    Some(sum) => sr.add(sum, product),
                    None => product,
                });
                a += 1;
                b += 1;
            }
        }
    }
    acc
}

/// `w = A ⊕.⊗ u`
fn mxv_kernel<T: Element>(a: &Matrix<T>, u: &Vector<T>, sr: Semiring) -> Result<Vector<T>> {
    if u.size() != a.ncols() {
        return Err(Error::ShapeMismatch {
            expected: Shape::Vector(a.ncols()),
            got: u.shape(),
        });
    }
    trace!("mxv {} on {} x {}", sr, a.shape(), u.shape());

    let dot = |p: usize| {
        let (row, cols, vals) = a.row_at(p);
        row_dot(cols, vals, u, sr).map(|v| (row, v))
    };
    let entries: Vec<(usize, T)> = if ExecConfig::global().should_parallelize(a.nvals()) {
        debug!("mxv: parallel over {} rows", a.stored_rows());
        (0..a.stored_rows()).into_par_iter().filter_map(dot).collect()
    } else {
        (0..a.stored_rows()).filter_map(dot).collect()
    };

    let (indices, values): (Vec<usize>, Vec<T>) = entries.into_iter().unzip();
    Ok(Vector::from_sorted_parts(a.nrows(), indices, values))
}

/// `C = A ⊕.⊗ B`, one sparse accumulator per output row
fn mxm_kernel<T: Element>(a: &Matrix<T>, b: &Matrix<T>, sr: Semiring) -> Result<Matrix<T>> {
    if a.ncols() != b.nrows() {
        return Err(Error::ShapeMismatch {
            expected: Shape::Matrix(a.ncols(), b.ncols()),
            got: b.shape(),
        });
    }
    trace!(
        "mxm {} on {} x {} nvals={}x{}",
        sr,
        a.shape(),
        b.shape(),
        a.nvals(),
        b.nvals()
    );

    let row_product = |spa: &mut Spa<T>, p: usize| -> Row<T> {
        let (row, cols, vals) = a.row_at(p);
        for (&k, &aik) in cols.iter().zip(vals) {
            let (b_cols, b_vals) = b.row_slices(k);
            for (&j, &bkj) in b_cols.iter().zip(b_vals) {
                spa.accumulate(sr, j, sr.multiply(aik, bkj));
            }
        }
        let (cols, vals) = spa.drain_sorted();
        (row, cols, vals)
    };

    let rows: Vec<Row<T>> = if ExecConfig::global().should_parallelize(a.nvals() + b.nvals()) {
        debug!("mxm: parallel over {} rows", a.stored_rows());
        (0..a.stored_rows())
            .into_par_iter()
            .map_init(Spa::new, row_product)
            .collect()
    } else {
        let mut spa = Spa::new();
        (0..a.stored_rows())
            .map(|p| row_product(&mut spa, p))
            .collect()
    };
    Matrix::from_rows(a.nrows(), b.ncols(), rows)
}

impl<T: Element> Vector<T> {
    /// `v ⊕.⊗ M` with the type's default semiring
    pub fn vxm(&self, m: &Matrix<T>) -> Result<Self> {
        self.vxm_semiring(m, T::SCALAR_TYPE.operators().semiring)
    }

    /// `v ⊕.⊗ M` with an explicit semiring
    pub fn vxm_semiring(&self, m: &Matrix<T>, sr: Semiring) -> Result<Self> {
        vxm_kernel(self, m, sr)
    }

    /// `v ⊕.⊗ M` written into `out`; `transpose_b` uses `Mᵀ`
    pub fn vxm_into(
        &self,
        m: &Matrix<T>,
        sr: Semiring,
        out: &mut Self,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let m = maybe_transposed(m, ctl.desc.transpose_b)?;
        let result = vxm_kernel(self, &m, sr)?;
        write_vector(out, result, ctl)
    }

    /// Replace this vector with `v ⊕.⊗ M`
    ///
    /// `M` must be square in the sense that the product has the same size
    /// as the vector.
    pub fn vxm_inplace(&mut self, m: &Matrix<T>, sr: Semiring) -> Result<()> {
        if m.ncols() != self.size() {
            return Err(Error::ShapeMismatch {
                expected: Shape::Matrix(self.size(), self.size()),
                got: m.shape(),
            });
        }
        *self = vxm_kernel(self, m, sr)?;
        Ok(())
    }
}

impl<T: Element> Matrix<T> {
    /// `A ⊕.⊗ u` with the type's default semiring
    pub fn mxv(&self, u: &Vector<T>) -> Result<Vector<T>> {
        self.mxv_semiring(u, T::SCALAR_TYPE.operators().semiring)
    }

    pub fn mxv_semiring(&self, u: &Vector<T>, sr: Semiring) -> Result<Vector<T>> {
        mxv_kernel(self, u, sr)
    }

    /// `A ⊕.⊗ u` written into `out`; `transpose_a` uses `Aᵀ`
    pub fn mxv_into(
        &self,
        u: &Vector<T>,
        sr: Semiring,
        out: &mut Vector<T>,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let a = maybe_transposed(self, ctl.desc.transpose_a)?;
        let result = mxv_kernel(&a, u, sr)?;
        write_vector(out, result, ctl)
    }

    /// `A ⊕.⊗ B` with the type's default semiring
    pub fn mxm(&self, b: &Self) -> Result<Self> {
        self.mxm_semiring(b, T::SCALAR_TYPE.operators().semiring)
    }

    pub fn mxm_semiring(&self, b: &Self, sr: Semiring) -> Result<Self> {
        mxm_kernel(self, b, sr)
    }

    /// `A ⊕.⊗ B` written into `out`, honoring both transpose flags
    pub fn mxm_into(
        &self,
        b: &Self,
        sr: Semiring,
        out: &mut Self,
        ctl: &MatrixOutput<'_>,
    ) -> Result<()> {
        let a = maybe_transposed(self, ctl.desc.transpose_a)?;
        let b = maybe_transposed(b, ctl.desc.transpose_b)?;
        let result = mxm_kernel(&a, &b, sr)?;
        write_matrix(out, result, ctl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{with_global, ExecConfig};
    use crate::descriptor::Descriptor;
    use proptest::prelude::*;

    /// 0 -> 1 (2), 0 -> 2 (5), 1 -> 2 (1), 2 -> 3 (4)
    fn graph() -> Matrix<i64> {
        Matrix::from_edge_list(&[0, 0, 1, 2], &[1, 2, 2, 3], &[2, 5, 1, 4], Some(4), Some(4))
            .unwrap()
    }

    #[test]
    fn test_vxm_plus_times() {
        let v = Vector::from_coordinates(&[0, 1], &[1i64, 10], Some(4)).unwrap();
        let w = v.vxm(&graph()).unwrap();
        // w[1] = 1*2, w[2] = 1*5 + 10*1; w[0], w[3] absent
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![(1, 2), (2, 15)]);
        assert_eq!(w.try_get(3).unwrap(), None);
    }

    #[test]
    fn test_vxm_min_plus_relaxation() {
        let dist = Vector::from_coordinates(&[0], &[0i64], Some(4)).unwrap();
        let step = dist.vxm_semiring(&graph(), Semiring::MIN_PLUS).unwrap();
        let dist = dist.ewise_add_op(&step, grblas_core::BinaryOp::Min).unwrap();
        let step = dist.vxm_semiring(&graph(), Semiring::MIN_PLUS).unwrap();
        let dist = dist.ewise_add_op(&step, grblas_core::BinaryOp::Min).unwrap();
        assert_eq!(
            dist.iter().collect::<Vec<_>>(),
            vec![(0, 0), (1, 2), (2, 3), (3, 9)]
        );
    }

    #[test]
    fn test_vxm_shape_law() {
        let v = Vector::<i64>::new(3).unwrap();
        assert_eq!(
            v.vxm(&graph()),
            Err(Error::ShapeMismatch {
                expected: Shape::Vector(4),
                got: Shape::Vector(3)
            })
        );
    }

    #[test]
    fn test_vxm_bool_reachability() {
        let m = Matrix::from_edge_list(&[0, 1], &[1, 2], &[true, true], Some(3), Some(3)).unwrap();
        let mut frontier = Vector::from_coordinates(&[0], &[true], Some(3)).unwrap();
        frontier.vxm_inplace(&m, Semiring::LOR_LAND).unwrap();
        assert_eq!(frontier.indices(), &[1]);
        frontier.vxm_inplace(&m, Semiring::LOR_LAND).unwrap();
        assert_eq!(frontier.indices(), &[2]);
        frontier.vxm_inplace(&m, Semiring::LOR_LAND).unwrap();
        assert_eq!(frontier.nvals(), 0);

        let rect = Matrix::<bool>::new(3, 2).unwrap();
        assert!(matches!(
            frontier.vxm_inplace(&rect, Semiring::LOR_LAND),
            Err(Error::ShapeMismatch { .. })
        ));
        assert_eq!(frontier.size(), 3);
    }

    #[test]
    fn test_mxv_matches_transposed_vxm() {
        let u = Vector::from_list(&[1i64, 2, 3, 4]).unwrap();
        let g = graph();
        let w = g.mxv(&u).unwrap();
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![(0, 19), (1, 3), (2, 16)]);

        let mut out = Vector::new(4).unwrap();
        let ctl = VectorOutput::new().with_desc(Descriptor::t1());
        u.vxm_into(&g, Semiring::PLUS_TIMES, &mut out, &ctl).unwrap();
        assert_eq!(out, w);
    }

    #[test]
    fn test_mxm_two_hop_paths() {
        let g = graph();
        let g2 = g.mxm(&g).unwrap();
        // 0 -> 1 -> 2 (2*1), 0 -> 2 -> 3 (5*4), 1 -> 2 -> 3 (1*4)
        assert_eq!(
            g2.iter().collect::<Vec<_>>(),
            vec![(0, 2, 2), (0, 3, 20), (1, 3, 4)]
        );
        let counts = g.mxm_semiring(&g, Semiring::PLUS_PAIR).unwrap();
        assert_eq!(counts.get(0, 3).unwrap(), 1);
    }

    #[test]
    fn test_mxm_into_transposes() {
        let a = Matrix::from_edge_list(&[0, 1], &[0, 0], &[2i64, 3], Some(2), Some(1)).unwrap();
        let mut out = Matrix::new(1, 1).unwrap();
        let ctl = MatrixOutput::new().with_desc(Descriptor::t0());
        // aᵀ a = 2*2 + 3*3
        a.mxm_into(&a, Semiring::PLUS_TIMES, &mut out, &ctl).unwrap();
        assert_eq!(out.get(0, 0).unwrap(), 13);

        let bad = a.mxm(&a);
        assert!(matches!(bad, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_parallel_mxm_matches_sequential() {
        let n = 60;
        let (mut rows, mut cols, mut vals) = (Vec::new(), Vec::new(), Vec::new());
        for i in 0..n {
            for j in 0..n {
                if (i * 7 + j * 3) % 5 == 0 {
                    rows.push(i);
                    cols.push(j);
                    vals.push(((i + j) % 11) as f64 * 0.1);
                }
            }
        }
        let m = Matrix::from_edge_list(&rows, &cols, &vals, Some(n), Some(n)).unwrap();
        let ones = Vector::from_list(&vec![1.0; n]).unwrap();
        let (seq, seq_mxv) = with_global(ExecConfig::sequential(), || {
            (
                mxm_kernel(&m, &m, Semiring::PLUS_TIMES).unwrap(),
                mxv_kernel(&m, &ones, Semiring::PLUS_TIMES).unwrap(),
            )
        });
        let (par, par_mxv) = with_global(ExecConfig::with_parallel_threshold(1), || {
            (
                mxm_kernel(&m, &m, Semiring::PLUS_TIMES),
                mxv_kernel(&m, &ones, Semiring::PLUS_TIMES),
            )
        });

        assert_eq!(par.unwrap(), seq);
        assert_eq!(par_mxv.unwrap(), seq_mxv);
    }

    proptest! {
        #[test]
        fn prop_vxm_rejects_wrong_size(size in 0usize..20, nrows in 0usize..20) {
            prop_assume!(size != nrows);
            let v = Vector::<i64>::new(size).unwrap();
            let m = Matrix::<i64>::new(nrows, 5).unwrap();
            let is_shape_mismatch = matches!(v.vxm(&m), Err(Error::ShapeMismatch { .. }));
            prop_assert!(is_shape_mismatch);
        }
    }
}
