//! Unary apply
//!
//! Apply keeps the stored pattern and transforms each stored value.

use grblas_core::{Element, Result, UnaryOp};
use log::trace;
use rayon::prelude::*;

use crate::config::ExecConfig;
use crate::matrix::Matrix;
use crate::output::{write_matrix, write_vector, MatrixOutput, VectorOutput};
use crate::storage::try_with_capacity;
use crate::vector::Vector;

/// Map every value, in parallel when the slice is large
fn map_values<T, F>(values: &[T], f: F) -> Result<Vec<T>>
where
    T: Element,
    F: Fn(T) -> T + Sync + Send,
{
    let mut mapped = try_with_capacity(values.len())?;
    if ExecConfig::global().should_parallelize(values.len()) {
        values.par_iter().map(|&v| f(v)).collect_into_vec(&mut mapped);
    } else {
        mapped.extend(values.iter().map(|&v| f(v)));
    }
    Ok(mapped)
}

impl<T: Element> Vector<T> {
    /// New vector with `op` applied to every stored value
    pub fn apply(&self, op: UnaryOp) -> Result<Self> {
        trace!("apply {} nvals={}", op, self.nvals());
        self.apply_fn(|x| op.apply(x))
    }

    /// New vector with a closure applied to every stored value
    pub fn apply_fn<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(T) -> T + Sync + Send,
    {
        let values = map_values(self.values(), f)?;
        let indices = crate::storage::try_to_vec(self.indices())?;
        Ok(Vector::from_sorted_parts(self.size(), indices, values))
    }

    /// Apply written through a mask/accumulator into `out`
    pub fn apply_into(&self, op: UnaryOp, out: &mut Self, ctl: &VectorOutput<'_>) -> Result<()> {
        let result = self.apply(op)?;
        write_vector(out, result, ctl)
    }
}

impl<T: Element> Matrix<T> {
    pub fn apply(&self, op: UnaryOp) -> Result<Self> {
        trace!("apply {} nvals={}", op, self.nvals());
        self.apply_fn(|x| op.apply(x))
    }

    pub fn apply_fn<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(T) -> T + Sync + Send,
    {
        let mut rows = try_with_capacity(self.stored_rows())?;
        for (row, cols, vals) in self.rows() {
            rows.push((row, crate::storage::try_to_vec(cols)?, map_values(vals, &f)?));
        }
        Matrix::from_rows(self.nrows(), self.ncols(), rows)
    }

    /// Apply written into `out`; `transpose_a` applies to `Aᵀ`
    pub fn apply_into(&self, op: UnaryOp, out: &mut Self, ctl: &MatrixOutput<'_>) -> Result<()> {
        let result = if ctl.desc.transpose_a {
            self.transpose()?.apply(op)?
        } else {
            self.apply(op)?
        };
        write_matrix(out, result, ctl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grblas_core::BinaryOp;

    #[test]
    fn test_apply_keeps_pattern() {
        let v = Vector::from_coordinates(&[1, 4], &[-3i64, 2], Some(6)).unwrap();
        let w = v.apply(UnaryOp::AInv).unwrap();
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![(1, 3), (4, -2)]);
        assert_eq!(w.size(), 6);
        let ones = v.apply(UnaryOp::One).unwrap();
        assert_eq!(ones.reduce(), 2);
    }

    #[test]
    fn test_apply_fn() {
        let v = Vector::from_list(&[1.0f32, 4.0, 9.0]).unwrap();
        let w = v.apply_fn(|x| x * 0.5).unwrap();
        assert_eq!(w.values(), &[0.5, 2.0, 4.5]);
    }

    #[test]
    fn test_apply_into_with_accum() {
        let v = Vector::from_list(&[1i32, 2, 3]).unwrap();
        let mut out = Vector::from_list(&[10i32, 10, 10]).unwrap();
        let ctl = VectorOutput::new().with_accum(BinaryOp::Plus);
        v.apply_into(UnaryOp::AInv, &mut out, &ctl).unwrap();
        assert_eq!(out.values(), &[9, 8, 7]);
    }

    #[test]
    fn test_matrix_apply() {
        let m = Matrix::from_edge_list(&[0, 2], &[1, 0], &[-1.5f64, 2.0], Some(3), Some(2))
            .unwrap();
        let a = m.apply(UnaryOp::Abs).unwrap();
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![(0, 1, 1.5), (2, 0, 2.0)]);

        let mut out = Matrix::new(2, 3).unwrap();
        let ctl = MatrixOutput::new().with_desc(crate::descriptor::Descriptor::t0());
        m.apply_into(UnaryOp::MInv, &mut out, &ctl).unwrap();
        assert_eq!(out.get(1, 0).unwrap(), -1.0 / 1.5);
        assert_eq!(out.get(0, 2).unwrap(), 0.5);
    }
}
