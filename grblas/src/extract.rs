//! Range extraction
//!
//! Extraction reads a sub-vector or sub-matrix selected by `RangeSpec`s
//! and renumbers it to local coordinates: the entry at source index
//! `range.index(k)` lands at position `k`. Lists may repeat indices, in
//! which case the same source entry shows up at several positions.

use grblas_core::{check_index, Element, RangeSpec, Result};
use log::trace;

use crate::index::Selection;
use crate::matrix::{Matrix, Row};
use crate::mxm::maybe_transposed;
use crate::output::{write_matrix, write_vector, MatrixOutput, VectorOutput};
use crate::storage::try_with_capacity;
use crate::vector::Vector;

impl<T: Element> Vector<T> {
    /// Sub-vector of the selected positions, sized to the selection
    pub fn extract(&self, range: &RangeSpec) -> Result<Self> {
        let sel = Selection::new(range, self.size())?;
        trace!("extract {:?} from size={}", range, self.size());
        let (indices, values) = sel.gather(self.indices(), self.values())?;
        Ok(Vector::from_sorted_parts(sel.len(), indices, values))
    }

    pub fn extract_into(
        &self,
        range: &RangeSpec,
        out: &mut Self,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let result = self.extract(range)?;
        write_vector(out, result, ctl)
    }
}

impl<T: Element> Matrix<T> {
    /// Local and source ids of the selected rows that hold entries,
    /// ascending by local id
    fn selected_rows(&self, sel: &Selection<'_>, spec: &RangeSpec) -> Result<Vec<(usize, usize)>> {
        let mut picked = try_with_capacity(self.stored_rows().min(sel.len()))?;
        if spec.is_arithmetic() {
            for &row in self.row_ids() {
                if let Some(k) = sel.position_of(row) {
                    picked.push((k, row));
                }
            }
        } else {
            for k in 0..sel.len() {
                let row = sel.index(k);
                if self.row_ids().binary_search(&row).is_ok() {
                    picked.push((k, row));
                }
            }
        }
        Ok(picked)
    }

    /// Entries of row `row` at the selected columns
    pub fn extract_row(&self, row: usize, cols: &RangeSpec) -> Result<Vector<T>> {
        check_index(row, self.nrows())?;
        let sel = Selection::new(cols, self.ncols())?;
        let (idx, vals) = self.row_slices(row);
        let (indices, values) = sel.gather(idx, vals)?;
        Ok(Vector::from_sorted_parts(sel.len(), indices, values))
    }

    /// Entries of column `col` at the selected rows
    pub fn extract_column(&self, col: usize, rows: &RangeSpec) -> Result<Vector<T>> {
        check_index(col, self.ncols())?;
        let sel = Selection::new(rows, self.nrows())?;
        let picked = self.selected_rows(&sel, rows)?;

        let mut indices = try_with_capacity(picked.len())?;
        let mut values = try_with_capacity(picked.len())?;
        for (k, row) in picked {
            let (idx, vals) = self.row_slices(row);
            if let Ok(p) = idx.binary_search(&col) {
                indices.push(k);
                values.push(vals[p]);
            }
        }
        Ok(Vector::from_sorted_parts(sel.len(), indices, values))
    }

    /// Column extraction that reads row `index` instead when `transpose`
    /// is set
    pub fn extract_vector(
        &self,
        index: usize,
        range: &RangeSpec,
        transpose: bool,
    ) -> Result<Vector<T>> {
        if transpose {
            self.extract_row(index, range)
        } else {
            self.extract_column(index, range)
        }
    }

    /// Column extraction written into `out`; `transpose_a` reads a row
    pub fn extract_column_into(
        &self,
        col: usize,
        rows: &RangeSpec,
        out: &mut Vector<T>,
        ctl: &VectorOutput<'_>,
    ) -> Result<()> {
        let result = self.extract_vector(col, rows, ctl.desc.transpose_a)?;
        write_vector(out, result, ctl)
    }

    /// Sub-matrix of the selected rows and columns
    pub fn extract(&self, rows: &RangeSpec, cols: &RangeSpec) -> Result<Self> {
        let row_sel = Selection::new(rows, self.nrows())?;
        let col_sel = Selection::new(cols, self.ncols())?;
        trace!(
            "extract {:?} x {:?} from {}x{}",
            rows,
            cols,
            self.nrows(),
            self.ncols()
        );

        let picked = self.selected_rows(&row_sel, rows)?;
        let mut out: Vec<Row<T>> = try_with_capacity(picked.len())?;
        for (k, row) in picked {
            let (idx, vals) = self.row_slices(row);
            let (local_cols, local_vals) = col_sel.gather(idx, vals)?;
            out.push((k, local_cols, local_vals));
        }
        Matrix::from_rows(row_sel.len(), col_sel.len(), out)
    }

    /// Sub-matrix extraction written into `out`; `transpose_a` selects
    /// from `Aᵀ`
    pub fn extract_into(
        &self,
        rows: &RangeSpec,
        cols: &RangeSpec,
        out: &mut Self,
        ctl: &MatrixOutput<'_>,
    ) -> Result<()> {
        let a = maybe_transposed(self, ctl.desc.transpose_a)?;
        let result = a.extract(rows, cols)?;
        write_matrix(out, result, ctl)
    }
}
