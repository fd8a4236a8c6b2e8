//! Sparse matrix storage
//!
//! Matrices use a hypersparse compressed-row layout: only rows holding at
//! least one entry are listed, each with its columns strictly ascending.
//! Memory is proportional to the number of stored entries, never to the
//! dimensions, so very tall matrices cost nothing until populated.

use grblas_core::{
    check_index, validate_dimension, Element, Error, Result, ScalarType, Shape, SparseShape,
};
use log::{debug, trace};
use rayon::slice::ParallelSliceMut;

use crate::config::ExecConfig;
use crate::storage::{sort_dedup_last, try_to_vec, try_with_capacity};

/// One assembled row: row id, ascending columns, aligned values
pub(crate) type Row<T> = (usize, Vec<usize>, Vec<T>);

/// Sparse matrix with a fixed element type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "MatrixParts<T>",
        into = "MatrixParts<T>",
        bound(
            serialize = "T: serde::Serialize",
            deserialize = "T: serde::Deserialize<'de>"
        )
    )
)]
pub struct Matrix<T: Element> {
    nrows: usize,
    ncols: usize,
    /// Ids of non-empty rows, ascending
    row_ids: Vec<usize>,
    /// Entry offsets per listed row, `row_ids.len() + 1` long
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Element> Matrix<T> {
    /// Empty matrix of the given shape
    pub fn new(nrows: usize, ncols: usize) -> Result<Self> {
        let nrows = validate_dimension("nrows", nrows)?;
        let ncols = validate_dimension("ncols", ncols)?;
        Ok(Self {
            nrows,
            ncols,
            row_ids: Vec::new(),
            row_ptr: vec![0],
            col_idx: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Build from row/column/value triples in input order
    ///
    /// A later triple at the same cell overwrites an earlier one, exactly
    /// as a sequence of `set` calls would. Missing dimensions default to
    /// the largest index seen plus one.
    pub fn from_edge_list(
        rows: &[usize],
        cols: &[usize],
        values: &[T],
        nrows: Option<usize>,
        ncols: Option<usize>,
    ) -> Result<Self> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(Error::InvalidArgument {
                arg: "values",
                reason: "row, column and value lists differ in length",
            });
        }
        if rows.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "rows",
                reason: "edge list is empty",
            });
        }

        let max_row = rows.iter().copied().max().unwrap_or(0);
        let max_col = cols.iter().copied().max().unwrap_or(0);
        let nrows = validate_dimension("nrows", nrows.unwrap_or(max_row.saturating_add(1)))?;
        let ncols = validate_dimension("ncols", ncols.unwrap_or(max_col.saturating_add(1)))?;
        check_index(max_row, nrows)?;
        check_index(max_col, ncols)?;

        let mut entries = try_with_capacity(rows.len())?;
        entries.extend(
            rows.iter()
                .zip(cols)
                .zip(values)
                .map(|((&r, &c), &v)| ((r, c), v)),
        );
        let parallel = ExecConfig::global().should_parallelize(entries.len());
        let dropped = sort_dedup_last(&mut entries, parallel);
        if dropped > 0 {
            debug!("edge list build collapsed {dropped} repeated cells");
        }
        Self::from_sorted_entries(nrows, ncols, &entries)
    }

    /// Assemble from cells sorted by `(row, col)` without repeats
    pub(crate) fn from_sorted_entries(
        nrows: usize,
        ncols: usize,
        entries: &[((usize, usize), T)],
    ) -> Result<Self> {
        let nrows_stored = entries
            .windows(2)
            .filter(|w| w[0].0 .0 != w[1].0 .0)
            .count()
            + usize::from(!entries.is_empty());

        let mut row_ids = try_with_capacity(nrows_stored)?;
        let mut row_ptr = try_with_capacity(nrows_stored + 1)?;
        let mut col_idx = try_with_capacity(entries.len())?;
        let mut values = try_with_capacity(entries.len())?;
        row_ptr.push(0);
        for (pos, &((r, c), v)) in entries.iter().enumerate() {
            if row_ids.last() != Some(&r) {
                if pos > 0 {
                    row_ptr.push(pos);
                }
                row_ids.push(r);
            }
            col_idx.push(c);
            values.push(v);
        }
        if !entries.is_empty() {
            row_ptr.push(entries.len());
        }
        Ok(Self {
            nrows,
            ncols,
            row_ids,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Assemble from rows ascending by id; empty rows are skipped
    pub(crate) fn from_rows(nrows: usize, ncols: usize, rows: Vec<Row<T>>) -> Result<Self> {
        let total: usize = rows.iter().map(|(_, cols, _)| cols.len()).sum();
        let stored = rows.iter().filter(|(_, cols, _)| !cols.is_empty()).count();

        let mut row_ids = try_with_capacity(stored)?;
        let mut row_ptr = try_with_capacity(stored + 1)?;
        let mut col_idx = try_with_capacity(total)?;
        let mut values = try_with_capacity(total)?;
        row_ptr.push(0);
        for (row, cols, vals) in rows {
            if cols.is_empty() {
                continue;
            }
            debug_assert!(row_ids.last().map_or(true, |&last| last < row));
            row_ids.push(row);
            col_idx.extend_from_slice(&cols);
            values.extend_from_slice(&vals);
            row_ptr.push(col_idx.len());
        }
        Ok(Self {
            nrows,
            ncols,
            row_ids,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Assemble from untrusted coordinate lists that must already be
    /// sorted by `(row, col)` without repeats
    pub fn try_from_sorted_coordinates(
        nrows: usize,
        ncols: usize,
        rows: &[usize],
        cols: &[usize],
        values: &[T],
    ) -> Result<Self> {
        let nrows = validate_dimension("nrows", nrows)?;
        let ncols = validate_dimension("ncols", ncols)?;
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(Error::InvalidArgument {
                arg: "values",
                reason: "row, column and value lists differ in length",
            });
        }
        let mut entries = try_with_capacity(rows.len())?;
        for k in 0..rows.len() {
            check_index(rows[k], nrows)?;
            check_index(cols[k], ncols)?;
            entries.push(((rows[k], cols[k]), values[k]));
        }
        if entries.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(Error::InvalidArgument {
                arg: "rows",
                reason: "cells must be strictly ascending in row-major order",
            });
        }
        Self::from_sorted_entries(nrows, ncols, &entries)
    }

    /// Independent deep copy
    pub fn dup(&self) -> Result<Self> {
        Ok(Self {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ids: try_to_vec(&self.row_ids)?,
            row_ptr: try_to_vec(&self.row_ptr)?,
            col_idx: try_to_vec(&self.col_idx)?,
            values: try_to_vec(&self.values)?,
        })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries
    pub fn nvals(&self) -> usize {
        self.col_idx.len()
    }

    pub fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }

    /// Number of rows holding at least one entry
    pub(crate) fn stored_rows(&self) -> usize {
        self.row_ids.len()
    }

    /// The `p`-th non-empty row as `(row, cols, values)`
    #[inline]
    pub(crate) fn row_at(&self, p: usize) -> (usize, &[usize], &[T]) {
        let (start, end) = (self.row_ptr[p], self.row_ptr[p + 1]);
        (
            self.row_ids[p],
            &self.col_idx[start..end],
            &self.values[start..end],
        )
    }

    /// Ids of non-empty rows, ascending
    pub(crate) fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    /// Non-empty rows in ascending order
    pub(crate) fn rows(&self) -> impl Iterator<Item = (usize, &[usize], &[T])> + '_ {
        (0..self.row_ids.len()).map(move |p| self.row_at(p))
    }

    /// Stored columns and values of row `row`; empty slices if none
    pub fn row(&self, row: usize) -> Result<(&[usize], &[T])> {
        check_index(row, self.nrows)?;
        Ok(self.row_slices(row))
    }

    #[inline]
    pub(crate) fn row_slices(&self, row: usize) -> (&[usize], &[T]) {
        match self.row_ids.binary_search(&row) {
            Ok(p) => {
                let (_, cols, vals) = self.row_at(p);
                (cols, vals)
            }
            Err(_) => (&[], &[]),
        }
    }

    /// Stored value at `(row, col)`, `None` if absent
    pub fn try_get(&self, row: usize, col: usize) -> Result<Option<T>> {
        check_index(row, self.nrows)?;
        check_index(col, self.ncols)?;
        let (cols, vals) = self.row_slices(row);
        Ok(cols.binary_search(&col).ok().map(|k| vals[k]))
    }

    /// Value at `(row, col)`; absent cells read as zero
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        Ok(self.try_get(row, col)?.unwrap_or_else(T::zero))
    }

    /// Insert or overwrite a single cell
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        check_index(row, self.nrows)?;
        check_index(col, self.ncols)?;
        match self.row_ids.binary_search(&row) {
            Ok(p) => {
                let (start, end) = (self.row_ptr[p], self.row_ptr[p + 1]);
                match self.col_idx[start..end].binary_search(&col) {
                    Ok(k) => self.values[start + k] = value,
                    Err(k) => {
                        self.reserve_entries(1)?;
                        self.col_idx.insert(start + k, col);
                        self.values.insert(start + k, value);
                        for offset in &mut self.row_ptr[p + 1..] {
                            *offset += 1;
                        }
                    }
                }
            }
            Err(p) => {
                self.reserve_entries(1)?;
                self.row_ids
                    .try_reserve(1)
                    .map_err(|_| Error::out_of_memory())?;
                self.row_ptr
                    .try_reserve(1)
                    .map_err(|_| Error::out_of_memory())?;
                let start = self.row_ptr[p];
                self.col_idx.insert(start, col);
                self.values.insert(start, value);
                self.row_ids.insert(p, row);
                self.row_ptr.insert(p, start);
                for offset in &mut self.row_ptr[p + 1..] {
                    *offset += 1;
                }
            }
        }
        Ok(())
    }

    fn reserve_entries(&mut self, additional: usize) -> Result<()> {
        self.col_idx
            .try_reserve(additional)
            .map_err(|_| Error::out_of_memory())?;
        self.values
            .try_reserve(additional)
            .map_err(|_| Error::out_of_memory())
    }

    /// Delete a stored cell, returning its value
    pub fn remove(&mut self, row: usize, col: usize) -> Result<Option<T>> {
        check_index(row, self.nrows)?;
        check_index(col, self.ncols)?;
        let Ok(p) = self.row_ids.binary_search(&row) else {
            return Ok(None);
        };
        let (start, end) = (self.row_ptr[p], self.row_ptr[p + 1]);
        let Ok(k) = self.col_idx[start..end].binary_search(&col) else {
            return Ok(None);
        };
        self.col_idx.remove(start + k);
        let value = self.values.remove(start + k);
        for offset in &mut self.row_ptr[p + 1..] {
            *offset -= 1;
        }
        if self.row_ptr[p] == self.row_ptr[p + 1] {
            self.row_ids.remove(p);
            self.row_ptr.remove(p + 1);
        }
        Ok(Some(value))
    }

    /// Remove every stored entry, keeping shape and type
    pub fn clear(&mut self) {
        self.row_ids.clear();
        self.row_ptr.truncate(1);
        self.col_idx.clear();
        self.values.clear();
    }

    /// Change the shape; cells outside the new bounds are dropped
    pub fn resize(&mut self, nrows: usize, ncols: usize) -> Result<()> {
        let nrows = validate_dimension("nrows", nrows)?;
        let ncols = validate_dimension("ncols", ncols)?;
        if nrows >= self.nrows && ncols >= self.ncols {
            self.nrows = nrows;
            self.ncols = ncols;
            return Ok(());
        }

        let keep_rows = self.row_ids.partition_point(|&r| r < nrows);
        let mut rows = try_with_capacity(keep_rows)?;
        for p in 0..keep_rows {
            let (row, cols, vals) = self.row_at(p);
            let keep = cols.partition_point(|&c| c < ncols);
            rows.push((row, try_to_vec(&cols[..keep])?, try_to_vec(&vals[..keep])?));
        }
        let resized = Self::from_rows(nrows, ncols, rows)?;
        let dropped = self.nvals() - resized.nvals();
        if dropped > 0 {
            debug!(
                "resize {}x{} -> {}x{} dropped {} entries",
                self.nrows, self.ncols, nrows, ncols, dropped
            );
        }
        *self = resized;
        Ok(())
    }

    /// Same shape and same stored cells
    pub fn is_equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Stored cells as `(rows, cols, values)` in row-major order
    pub fn to_coordinate_lists(&self) -> Result<(Vec<usize>, Vec<usize>, Vec<T>)> {
        let mut rows = try_with_capacity(self.nvals())?;
        self.fill_entry_rows(&mut rows);
        Ok((rows, try_to_vec(&self.col_idx)?, try_to_vec(&self.values)?))
    }

    /// Push the row id of every stored cell, in row-major order
    fn fill_entry_rows(&self, rows: &mut Vec<usize>) {
        for (row, cols, _) in self.rows() {
            rows.extend(core::iter::repeat(row).take(cols.len()));
        }
    }

    /// Iterate `(row, col, value)` in row-major order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            matrix: self,
            row: 0,
            pos: 0,
        }
    }

    /// Swap rows and columns
    pub fn transpose(&self) -> Result<Self> {
        let mut entries = try_with_capacity(self.nvals())?;
        entries.extend(self.iter().map(|(r, c, v)| ((c, r), v)));
        if ExecConfig::global().should_parallelize(entries.len()) {
            entries.par_sort_unstable_by_key(|e| e.0);
        } else {
            entries.sort_unstable_by_key(|e| e.0);
        }
        trace!(
            "transpose {}x{} nvals={}",
            self.nrows,
            self.ncols,
            entries.len()
        );
        Self::from_sorted_entries(self.ncols, self.nrows, &entries)
    }

    /// Typecast every stored value into another element type
    pub fn cast<U: Element>(&self) -> Result<Matrix<U>> {
        let mut values = try_with_capacity(self.values.len())?;
        values.extend(self.values.iter().map(|v| U::cast_from(v.to_scalar())));
        Ok(Matrix {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ids: try_to_vec(&self.row_ids)?,
            row_ptr: try_to_vec(&self.row_ptr)?,
            col_idx: try_to_vec(&self.col_idx)?,
            values,
        })
    }
}

/// Row-major iterator over stored cells
#[derive(Debug, Clone)]
pub struct Iter<'a, T: Element> {
    matrix: &'a Matrix<T>,
    row: usize,
    pos: usize,
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = (usize, usize, T);

    fn next(&mut self) -> Option<Self::Item> {
        let m = self.matrix;
        if self.pos >= m.col_idx.len() {
            return None;
        }
        while m.row_ptr[self.row + 1] <= self.pos {
            self.row += 1;
        }
        let item = (m.row_ids[self.row], m.col_idx[self.pos], m.values[self.pos]);
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.matrix.col_idx.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<T: Element> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T: Element> IntoIterator for &'a Matrix<T> {
    type Item = (usize, usize, T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Element> SparseShape for Matrix<T> {
    fn shape(&self) -> Shape {
        Shape::Matrix(self.nrows, self.ncols)
    }

    fn nvals(&self) -> usize {
        self.col_idx.len()
    }

    fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }
}

/// Serialized form of a matrix: shape plus row-major coordinates
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MatrixParts<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub values: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T: Element> TryFrom<MatrixParts<T>> for Matrix<T> {
    type Error = Error;

    fn try_from(parts: MatrixParts<T>) -> Result<Self> {
        Matrix::try_from_sorted_coordinates(
            parts.nrows,
            parts.ncols,
            &parts.rows,
            &parts.cols,
            &parts.values,
        )
    }
}

#[cfg(feature = "serde")]
impl<T: Element> From<Matrix<T>> for MatrixParts<T> {
    fn from(m: Matrix<T>) -> Self {
        let mut rows = Vec::with_capacity(m.nvals());
        m.fill_entry_rows(&mut rows);
        MatrixParts {
            nrows: m.nrows,
            ncols: m.ncols,
            rows,
            cols: m.col_idx,
            values: m.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Matrix<i64> {
        Matrix::from_edge_list(
            &[0, 0, 2, 3, 3],
            &[1, 3, 0, 2, 3],
            &[1, 2, 3, 4, 5],
            Some(4),
            Some(4),
        )
        .unwrap()
    }

    #[test]
    fn test_edge_list_last_write_wins() {
        let a = Matrix::from_edge_list(&[0, 0, 1], &[0, 0, 1], &[1i64, 2, 3], None, None).unwrap();
        assert_eq!(a.get(0, 0).unwrap(), 2);
        assert_eq!(a.nvals(), 2);
        assert_eq!((a.nrows(), a.ncols()), (2, 2));
    }

    #[test]
    fn test_edge_list_rejects_bad_input() {
        assert!(matches!(
            Matrix::from_edge_list(&[0, 1], &[0], &[1i64, 2], None, None),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            Matrix::<i64>::from_edge_list(&[], &[], &[], Some(2), Some(2)),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(
            Matrix::from_edge_list(&[0], &[5], &[1i64], Some(2), Some(5)),
            Err(Error::OutOfBounds { index: 5, size: 5 })
        );
    }

    #[test]
    fn test_get_absent_reads_zero() {
        let m = sample();
        assert_eq!(m.get(1, 1).unwrap(), 0);
        assert_eq!(m.try_get(3, 2).unwrap(), Some(4));
        assert_eq!(m.get(4, 0), Err(Error::OutOfBounds { index: 4, size: 4 }));
    }

    #[test]
    fn test_set_inserts_rows_in_order() {
        let mut m = sample();
        m.set(1, 2, 9).unwrap();
        m.set(0, 0, 7).unwrap();
        m.set(3, 3, 50).unwrap();
        assert_eq!(m.nvals(), 7);
        let cells: Vec<_> = m.iter().collect();
        assert_eq!(
            cells,
            vec![
                (0, 0, 7),
                (0, 1, 1),
                (0, 3, 2),
                (1, 2, 9),
                (2, 0, 3),
                (3, 2, 4),
                (3, 3, 50)
            ]
        );
    }

    #[test]
    fn test_remove_drops_empty_rows() {
        let mut m = sample();
        assert_eq!(m.remove(2, 0).unwrap(), Some(3));
        assert_eq!(m.remove(2, 0).unwrap(), None);
        assert_eq!(m.stored_rows(), 2);
        assert_eq!(m.get(3, 3).unwrap(), 5);
        assert_eq!(m.nvals(), 4);
    }

    #[test]
    fn test_resize_drops_out_of_bounds() {
        let mut m = sample();
        m.resize(3, 2).unwrap();
        assert_eq!((m.nrows(), m.ncols()), (3, 2));
        assert_eq!(m.to_coordinate_lists().unwrap(), (vec![0, 2], vec![1, 0], vec![1, 3]));
        m.resize(10, 10).unwrap();
        assert_eq!(m.nvals(), 2);
        m.clear();
        assert_eq!(m.nvals(), 0);
        assert_eq!(m.nrows(), 10);
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_edge_list(&[0, 1, 1], &[2, 0, 2], &[1i32, 2, 3], Some(2), Some(3))
            .unwrap();
        let t = m.transpose().unwrap();
        assert_eq!((t.nrows(), t.ncols()), (3, 2));
        assert_eq!(t.get(2, 1).unwrap(), 3);
        assert_eq!(t.get(0, 1).unwrap(), 2);
        assert_eq!(t.transpose().unwrap(), m);
    }

    #[test]
    fn test_huge_dimensions_cost_nothing() {
        let mut m = Matrix::<f64>::new(1 << 40, 1 << 40).unwrap();
        m.set((1 << 40) - 1, 3, 1.5).unwrap();
        assert_eq!(m.nvals(), 1);
        assert!(matches!(
            Matrix::<f64>::new(usize::MAX, 1),
            Err(Error::InvalidArgument { arg: "nrows", .. })
        ));
    }

    #[test]
    fn test_try_from_sorted_coordinates() {
        let m = Matrix::try_from_sorted_coordinates(2, 2, &[0, 1], &[1, 0], &[1u64, 2]).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 2);
        assert!(Matrix::try_from_sorted_coordinates(2, 2, &[1, 0], &[0, 1], &[1u64, 2]).is_err());
        assert!(Matrix::try_from_sorted_coordinates(2, 2, &[0, 0], &[1, 1], &[1u64, 2]).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let m = sample();
        let json = serde_json::to_string(&m).unwrap();
        let back: Matrix<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    proptest! {
        #[test]
        fn prop_edge_list_matches_sequential_sets(
            cells in proptest::collection::vec((0usize..8, 0usize..8, -50i64..50), 1..60)
        ) {
            let rows: Vec<usize> = cells.iter().map(|c| c.0).collect();
            let cols: Vec<usize> = cells.iter().map(|c| c.1).collect();
            let vals: Vec<i64> = cells.iter().map(|c| c.2).collect();
            let built = Matrix::from_edge_list(&rows, &cols, &vals, Some(8), Some(8)).unwrap();

            let mut manual = Matrix::new(8, 8).unwrap();
            for &(r, c, v) in &cells {
                manual.set(r, c, v).unwrap();
            }
            prop_assert_eq!(built, manual);
        }

        #[test]
        fn prop_dup_is_independent(
            cells in proptest::collection::vec((0usize..6, 0usize..6, -50i64..50), 1..30)
        ) {
            let rows: Vec<usize> = cells.iter().map(|c| c.0).collect();
            let cols: Vec<usize> = cells.iter().map(|c| c.1).collect();
            let vals: Vec<i64> = cells.iter().map(|c| c.2).collect();
            let m = Matrix::from_edge_list(&rows, &cols, &vals, Some(6), Some(6)).unwrap();
            let before = m.clone();
            let mut copy = m.dup().unwrap();
            prop_assert!(copy.is_equal(&m));
            copy.clear();
            prop_assert_eq!(m, before);
        }
    }
}
