//! Range assignment
//!
//! Assignment writes a source (or a broadcast scalar) into the positions
//! a `RangeSpec` selects and leaves every other position alone. Without
//! an accumulator the selected region takes the source pattern exactly,
//! so selected positions the source does not hold are cleared. With an
//! accumulator the old and new values are combined as `accum(old, new)`
//! and nothing is cleared. A list that names the same index twice keeps
//! the value from its last occurrence.
//!
//! The result is built in full before it replaces the target, so a
//! failing assignment leaves the target untouched.

use grblas_core::{check_index, BinaryOp, Element, Error, RangeSpec, Result, Shape, SparseShape};
use log::trace;

use crate::index::Selection;
use crate::matrix::{Matrix, Row};
use crate::merge::{merge_sorted, pair_rows, MergeStrategy};
use crate::storage::try_with_capacity;
use crate::vector::Vector;

/// Replace the selected part of a sorted run with `incoming`
fn splice_run<T: Element>(
    old: (&[usize], &[T]),
    sel: &Selection<'_>,
    incoming: (&[usize], &[T]),
    accum: Option<BinaryOp>,
) -> Result<(Vec<usize>, Vec<T>)> {
    let (old_idx, old_val) = old;
    let (mut kept_idx, mut kept_val) = (Vec::new(), Vec::new());
    let (mut hit_idx, mut hit_val) = (Vec::new(), Vec::new());
    for (&i, &v) in old_idx.iter().zip(old_val) {
        if sel.contains(i) {
            hit_idx.push(i);
            hit_val.push(v);
        } else {
            kept_idx.push(i);
            kept_val.push(v);
        }
    }

    let (mut region_idx, mut region_val) = (Vec::new(), Vec::new());
    match accum {
        Some(op) => merge_sorted(
            MergeStrategy::Union,
            (&hit_idx, &hit_val),
            incoming,
            |x, y| op.apply(x, y),
            &mut region_idx,
            &mut region_val,
        )?,
        None => {
            region_idx.extend_from_slice(incoming.0);
            region_val.extend_from_slice(incoming.1);
        }
    }

    // the two runs are disjoint, so the operator never fires
    let (mut idx, mut val) = (Vec::new(), Vec::new());
    merge_sorted(
        MergeStrategy::Union,
        (&kept_idx, &kept_val),
        (&region_idx, &region_val),
        |x, _| x,
        &mut idx,
        &mut val,
    )?;
    Ok((idx, val))
}

fn broadcast<T: Element>(value: T, n: usize) -> Result<Vec<T>> {
    let mut values = try_with_capacity(n)?;
    values.resize(n, value);
    Ok(values)
}

impl<T: Element> Vector<T> {
    /// Write `src` into the selected positions
    ///
    /// `src.size()` must equal the number of selected positions.
    pub fn assign(&mut self, src: &Self, range: &RangeSpec) -> Result<()> {
        self.assign_with(src, range, None)
    }

    /// Write `src` into the selected positions, combining with an
    /// accumulator when one is given
    pub fn assign_with(
        &mut self,
        src: &Self,
        range: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let sel = Selection::new(range, self.size())?;
        if src.size() != sel.len() {
            return Err(Error::ShapeMismatch {
                expected: Shape::Vector(sel.len()),
                got: src.shape(),
            });
        }
        trace!(
            "assign nvals={} into {:?} of size={}",
            src.nvals(),
            range,
            self.size()
        );
        let (idx, vals) = sel.scatter(src.indices(), src.values())?;
        self.splice(&sel, (&idx, &vals), accum)
    }

    /// Set every selected position to `value`
    pub fn assign_scalar(&mut self, value: T, range: &RangeSpec) -> Result<()> {
        self.assign_scalar_with(value, range, None)
    }

    pub fn assign_scalar_with(
        &mut self,
        value: T,
        range: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let sel = Selection::new(range, self.size())?;
        let targets = sel.targets()?;
        let values = broadcast(value, targets.len())?;
        self.splice(&sel, (&targets, &values), accum)
    }

    fn splice(
        &mut self,
        sel: &Selection<'_>,
        incoming: (&[usize], &[T]),
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let (idx, vals) = splice_run((self.indices(), self.values()), sel, incoming, accum)?;
        *self = Vector::from_sorted_parts(self.size(), idx, vals);
        Ok(())
    }
}

impl<T: Element> Matrix<T> {
    /// Write `src` into the block selected by `rows` x `cols`
    pub fn assign(&mut self, src: &Self, rows: &RangeSpec, cols: &RangeSpec) -> Result<()> {
        self.assign_with(src, rows, cols, None)
    }

    pub fn assign_with(
        &mut self,
        src: &Self,
        rows: &RangeSpec,
        cols: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let row_sel = Selection::new(rows, self.nrows())?;
        let col_sel = Selection::new(cols, self.ncols())?;
        let expected = Shape::Matrix(row_sel.len(), col_sel.len());
        if src.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                got: src.shape(),
            });
        }
        trace!(
            "assign nvals={} into {:?} x {:?} of {}x{}",
            src.nvals(),
            rows,
            cols,
            self.nrows(),
            self.ncols()
        );

        let mut incoming: Vec<Row<T>> = try_with_capacity(src.stored_rows())?;
        for (k, local_cols, local_vals) in src.rows() {
            let target = row_sel.index(k);
            if row_sel.position_of(target) == Some(k) {
                let (idx, vals) = col_sel.scatter(local_cols, local_vals)?;
                incoming.push((target, idx, vals));
            }
        }
        if !rows.is_arithmetic() {
            incoming.sort_unstable_by_key(|r| r.0);
        }
        self.splice(&row_sel, &col_sel, incoming, accum)
    }

    /// Set every cell of the selected block to `value`
    pub fn assign_scalar(&mut self, value: T, rows: &RangeSpec, cols: &RangeSpec) -> Result<()> {
        self.assign_scalar_with(value, rows, cols, None)
    }

    pub fn assign_scalar_with(
        &mut self,
        value: T,
        rows: &RangeSpec,
        cols: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let row_sel = Selection::new(rows, self.nrows())?;
        let col_sel = Selection::new(cols, self.ncols())?;
        let col_targets = col_sel.targets()?;
        let values = broadcast(value, col_targets.len())?;

        let row_targets = row_sel.targets()?;
        let mut incoming: Vec<Row<T>> = try_with_capacity(row_targets.len())?;
        for row in row_targets {
            incoming.push((row, col_targets.clone(), values.clone()));
        }
        self.splice(&row_sel, &col_sel, incoming, accum)
    }

    /// Write `src` into row `row` at the selected columns
    pub fn assign_row(&mut self, row: usize, src: &Vector<T>, cols: &RangeSpec) -> Result<()> {
        self.assign_row_with(row, src, cols, None)
    }

    pub fn assign_row_with(
        &mut self,
        row: usize,
        src: &Vector<T>,
        cols: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        check_index(row, self.nrows())?;
        let (indices, values) = src.to_coordinate_lists()?;
        let block = Matrix::from_rows(1, src.size(), vec![(0, indices, values)])?;
        self.assign_with(&block, &RangeSpec::single(row), cols, accum)
    }

    /// Write `src` into column `col` at the selected rows
    pub fn assign_col(&mut self, col: usize, src: &Vector<T>, rows: &RangeSpec) -> Result<()> {
        self.assign_col_with(col, src, rows, None)
    }

    pub fn assign_col_with(
        &mut self,
        col: usize,
        src: &Vector<T>,
        rows: &RangeSpec,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        check_index(col, self.ncols())?;
        let mut block_rows: Vec<Row<T>> = try_with_capacity(src.nvals())?;
        for (k, v) in src.iter() {
            block_rows.push((k, vec![0], vec![v]));
        }
        let block = Matrix::from_rows(src.size(), 1, block_rows)?;
        self.assign_with(&block, rows, &RangeSpec::single(col), accum)
    }

    /// Rebuild with the selected block replaced by `incoming` rows, which
    /// are keyed by target row and sorted
    fn splice(
        &mut self,
        row_sel: &Selection<'_>,
        col_sel: &Selection<'_>,
        incoming: Vec<Row<T>>,
        accum: Option<BinaryOp>,
    ) -> Result<()> {
        let ids: Vec<usize> = incoming.iter().map(|r| r.0).collect();
        let pairs = pair_rows(MergeStrategy::Union, self.row_ids(), &ids)?;
        let empty: (&[usize], &[T]) = (&[], &[]);

        let mut rows: Vec<Row<T>> = try_with_capacity(pairs.len())?;
        for (row, pa, pb) in pairs {
            let old = pa.map_or(empty, |p| {
                let (_, cols, vals) = self.row_at(p);
                (cols, vals)
            });
            if !row_sel.contains(row) {
                rows.push((row, old.0.to_vec(), old.1.to_vec()));
                continue;
            }
            let new = pb.map_or(empty, |p| {
                let (_, cols, vals) = &incoming[p];
                (cols.as_slice(), vals.as_slice())
            });
            let (cols, vals) = splice_run(old, col_sel, new, accum)?;
            rows.push((row, cols, vals));
        }
        *self = Matrix::from_rows(self.nrows(), self.ncols(), rows)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_assign_takes_source_pattern() {
        let mut v = Vector::from_list(&[1i64, 2, 3, 4, 5]).unwrap();
        let src = Vector::from_coordinates(&[0, 2], &[10i64, 30], Some(3)).unwrap();
        v.assign(&src, &RangeSpec::Range { start: 1, stop: 4 }).unwrap();
        assert_eq!(
            v.iter().collect::<Vec<_>>(),
            vec![(0, 1), (1, 10), (3, 30), (4, 5)]
        );
    }

    #[test]
    fn test_vector_assign_with_accum_keeps_old() {
        let mut v = Vector::from_coordinates(&[1, 2], &[5i32, 6], Some(4)).unwrap();
        let src = Vector::from_coordinates(&[0], &[-1i32], Some(2)).unwrap();
        v.assign_with(&src, &RangeSpec::List(vec![2, 3]), Some(BinaryOp::Minus))
            .unwrap();
        // 6 - (-1) at index 2; index 1 lies outside the selection
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 5), (2, 7)]);
    }

    #[test]
    fn test_vector_assign_list_last_wins() {
        let mut v = Vector::<u32>::new(4).unwrap();
        let src = Vector::from_list(&[1u32, 2, 3]).unwrap();
        v.assign(&src, &RangeSpec::List(vec![3, 0, 3])).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(0, 2), (3, 3)]);
    }

    #[test]
    fn test_vector_assign_size_checks() {
        let mut v = Vector::<f64>::new(5).unwrap();
        let src = Vector::<f64>::new(2).unwrap();
        assert_eq!(
            v.assign(&src, &RangeSpec::Range { start: 0, stop: 3 }),
            Err(Error::ShapeMismatch {
                expected: Shape::Vector(3),
                got: Shape::Vector(2)
            })
        );
        assert!(matches!(
            v.assign(&src, &RangeSpec::Range { start: 4, stop: 6 }),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_vector_assign_scalar() {
        let mut v = Vector::from_coordinates(&[0], &[9i64], Some(6)).unwrap();
        v.assign_scalar(1, &RangeSpec::Stride { start: 0, step: 2, stop: 6 })
            .unwrap();
        assert_eq!(v.indices(), &[0, 2, 4]);
        assert_eq!(v.values(), &[1, 1, 1]);
        v.assign_scalar_with(5, &RangeSpec::All, Some(BinaryOp::Plus))
            .unwrap();
        assert_eq!(v.values(), &[6, 5, 6, 5, 6, 5]);
    }

    #[test]
    fn test_matrix_assign_block() {
        let mut m = Matrix::from_edge_list(&[0, 1, 2], &[0, 1, 2], &[1i64, 1, 1], Some(3), Some(3))
            .unwrap();
        let src = Matrix::from_edge_list(&[0], &[1], &[7i64], Some(2), Some(2)).unwrap();
        m.assign(
            &src,
            &RangeSpec::Range { start: 1, stop: 3 },
            &RangeSpec::Range { start: 1, stop: 3 },
        )
        .unwrap();
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(0, 0, 1), (1, 2, 7)]);
    }

    #[test]
    fn test_matrix_assign_scalar_with_accum() {
        let mut m = Matrix::from_edge_list(&[0], &[0], &[2i32], Some(2), Some(3)).unwrap();
        m.assign_scalar_with(3, &RangeSpec::single(0), &RangeSpec::All, Some(BinaryOp::Times))
            .unwrap();
        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            vec![(0, 0, 6), (0, 1, 3), (0, 2, 3)]
        );
    }

    #[test]
    fn test_assign_row_and_col() {
        let mut m = Matrix::<i64>::new(3, 3).unwrap();
        let v = Vector::from_list(&[4i64, 5, 6]).unwrap();
        m.assign_row(1, &v, &RangeSpec::All).unwrap();
        assert_eq!(m.extract_row(1, &RangeSpec::All).unwrap(), v);

        let c = Vector::from_coordinates(&[0, 2], &[8i64, 9], Some(3)).unwrap();
        m.assign_col(1, &c, &RangeSpec::All).unwrap();
        assert_eq!(
            m.iter().collect::<Vec<_>>(),
            vec![(0, 1, 8), (1, 0, 4), (1, 2, 6), (2, 1, 9)]
        );

        assert!(m.assign_row(3, &v, &RangeSpec::All).is_err());
        let before = m.dup().unwrap();
        assert!(m.assign_col(0, &v, &RangeSpec::Range { start: 0, stop: 2 }).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn test_assign_row_col_far_out_of_range() {
        let mut m = Matrix::<i64>::new(3, 3).unwrap();
        let v = Vector::from_list(&[1i64, 2, 3]).unwrap();
        assert_eq!(
            m.assign_row(usize::MAX, &v, &RangeSpec::All),
            Err(Error::OutOfBounds { index: usize::MAX, size: 3 })
        );
        assert_eq!(
            m.assign_col_with(usize::MAX, &v, &RangeSpec::All, Some(BinaryOp::Plus)),
            Err(Error::OutOfBounds { index: usize::MAX, size: 3 })
        );
        assert_eq!(m.nvals(), 0);
    }

    #[test]
    fn test_matrix_assign_shape_mismatch() {
        let mut m = Matrix::<f32>::new(4, 4).unwrap();
        let src = Matrix::<f32>::new(2, 3).unwrap();
        assert_eq!(
            m.assign(&src, &RangeSpec::All, &RangeSpec::All),
            Err(Error::ShapeMismatch {
                expected: Shape::Matrix(4, 4),
                got: Shape::Matrix(2, 3)
            })
        );
    }
}
