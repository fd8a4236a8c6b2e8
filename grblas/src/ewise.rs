//! Element-wise combination
//!
//! `ewise_add` combines over the union of stored positions and leaves
//! single-sided entries unchanged; `ewise_mult` combines over the
//! intersection. The operator defaults to the element type's add or
//! multiply operator.

use grblas_core::{check_same_shape, BinaryOp, Element, Result, SparseShape};
use log::trace;

use crate::matrix::Matrix;
use crate::merge::{merge_matrices, merge_vectors, MergeStrategy};
use crate::output::{write_matrix, write_vector, MatrixOutput, VectorOutput};
use crate::vector::Vector;

impl<T: Element> Vector<T> {
    /// Union combine with the type's default add operator
    pub fn ewise_add(&self, other: &Self) -> Result<Self> {
        self.ewise_add_op(other, T::SCALAR_TYPE.operators().add)
    }

    /// Union combine with an explicit operator
    pub fn ewise_add_op(&self, other: &Self, op: BinaryOp) -> Result<Self> {
        self.ewise(other, op, MergeStrategy::Union)
    }

    /// Union combine written through a mask/accumulator into `out`
    pub fn ewise_add_into(
        &self,
        other: &Self,
        op: BinaryOp,
        out: &mut Self,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let result = self.ewise_add_op(other, op)?;
        write_vector(out, result, ctl)
    }

    /// Intersection combine with the type's default multiply operator
    pub fn ewise_mult(&self, other: &Self) -> Result<Self> {
        self.ewise_mult_op(other, T::SCALAR_TYPE.operators().mult)
    }

    /// Intersection combine with an explicit operator
    pub fn ewise_mult_op(&self, other: &Self, op: BinaryOp) -> Result<Self> {
        self.ewise(other, op, MergeStrategy::Intersection)
    }

    /// Intersection combine written through a mask/accumulator into `out`
    pub fn ewise_mult_into(
        &self,
        other: &Self,
        op: BinaryOp,
        out: &mut Self,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let result = self.ewise_mult_op(other, op)?;
        write_vector(out, result, ctl)
    }

    fn ewise(&self, other: &Self, op: BinaryOp, strategy: MergeStrategy) -> Result<Self> {
        check_same_shape(self.shape(), other.shape())?;
        trace!(
            "ewise {:?} {} on {} nvals={}+{}",
            strategy,
            op,
            self.shape(),
            self.nvals(),
            other.nvals()
        );
        merge_vectors(strategy, self, other, |x, y| op.apply(x, y))
    }
}

impl<T: Element> Matrix<T> {
    /// Union combine with the type's default add operator
    pub fn ewise_add(&self, other: &Self) -> Result<Self> {
        self.ewise_add_op(other, T::SCALAR_TYPE.operators().add)
    }

    pub fn ewise_add_op(&self, other: &Self, op: BinaryOp) -> Result<Self> {
        self.ewise(other, op, MergeStrategy::Union)
    }

    pub fn ewise_add_into(
        &self,
        other: &Self,
        op: BinaryOp,
        out: &mut Self,
        ctl: &MatrixOutput<'_>,
    ) -> Result<()> {
        let result = self.ewise_add_op(other, op)?;
        write_matrix(out, result, ctl)
    }

    /// Intersection combine with the type's default multiply operator
    pub fn ewise_mult(&self, other: &Self) -> Result<Self> {
        self.ewise_mult_op(other, T::SCALAR_TYPE.operators().mult)
    }

    pub fn ewise_mult_op(&self, other: &Self, op: BinaryOp) -> Result<Self> {
        self.ewise(other, op, MergeStrategy::Intersection)
    }

    pub fn ewise_mult_into(
        &self,
        other: &Self,
        op: BinaryOp,
        out: &mut Self,
        ctl: &MatrixOutput<'_>,
    ) -> Result<()> {
        let result = self.ewise_mult_op(other, op)?;
        write_matrix(out, result, ctl)
    }

    fn ewise(&self, other: &Self, op: BinaryOp, strategy: MergeStrategy) -> Result<Self> {
        check_same_shape(self.shape(), other.shape())?;
        trace!(
            "ewise {:?} {} on {} nvals={}+{}",
            strategy,
            op,
            self.shape(),
            self.nvals(),
            other.nvals()
        );
        merge_matrices(strategy, self, other, |x, y| op.apply(x, y))
    }
}
