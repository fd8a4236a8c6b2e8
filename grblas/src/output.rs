//! Masked, accumulated output write-back
//!
//! Every `_into` operation computes its result `T` in fresh storage and
//! then hands it here together with the caller's output control:
//!
//! 1. `Z = accum ? out ⊕∪ T : T`, where `⊕∪` is the union merge with the
//!    accumulator (old value on the left)
//! 2. for each position, if the mask allows it the output takes `Z`'s
//!    entry, or becomes absent when `Z` has none
//! 3. positions the mask blocks keep their old entry, unless the
//!    descriptor asks for replace, in which case they are cleared
//!
//! The new output is assembled completely before it replaces the old
//! one, so a failing call leaves the output as it was.

use grblas_core::{check_same_shape, BinaryOp, Element, Error, Result, SparseShape};
use log::trace;

use crate::descriptor::Descriptor;
use crate::matrix::{Matrix, Row};
use crate::merge::{merge_matrices, merge_vectors, pair_rows, MergeStrategy};
use crate::vector::Vector;

/// Mask, accumulator and descriptor for one operation
#[derive(Debug)]
pub struct OutputControl<'a, M> {
    /// Restrict which output positions may be written
    pub mask: Option<&'a M>,
    /// Combine new values with existing output entries
    pub accum: Option<BinaryOp>,
    pub desc: Descriptor,
}

/// Output control for vector results
pub type VectorOutput<'a> = OutputControl<'a, Vector<bool>>;

/// Output control for matrix results
pub type MatrixOutput<'a> = OutputControl<'a, Matrix<bool>>;

impl<'a, M> OutputControl<'a, M> {
    /// Unmasked, unaccumulated, default descriptor
    pub const fn new() -> Self {
        Self {
            mask: None,
            accum: None,
            desc: Descriptor::new(),
        }
    }

    pub const fn with_mask(mut self, mask: &'a M) -> Self {
        self.mask = Some(mask);
        self
    }

    pub const fn with_accum(mut self, accum: BinaryOp) -> Self {
        self.accum = Some(accum);
        self
    }

    pub const fn with_desc(mut self, desc: Descriptor) -> Self {
        self.desc = desc;
        self
    }

    /// Every position is writable
    fn unmasked(&self) -> bool {
        self.mask.is_none() && !self.desc.complement_mask
    }
}

impl<M> Default for OutputControl<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for OutputControl<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for OutputControl<'_, M> {}

/// One row (or the whole vector) of a mask, as seen by the write-back
struct MaskRow<'a> {
    entries: Option<(&'a [usize], &'a [bool])>,
    structural: bool,
    complement: bool,
}

impl MaskRow<'_> {
    #[inline]
    fn allows(&self, pos: usize) -> bool {
        let hit = match self.entries {
            None => true,
            Some((idx, vals)) => match idx.binary_search(&pos) {
                Ok(k) => self.structural || vals[k],
                Err(_) => false,
            },
        };
        hit != self.complement
    }
}

/// Merge `old` and `z` under the mask into `out_idx`/`out_val`
fn masked_merge<T: Element>(
    old: (&[usize], &[T]),
    z: (&[usize], &[T]),
    mask: &MaskRow<'_>,
    replace: bool,
    out_idx: &mut Vec<usize>,
    out_val: &mut Vec<T>,
) -> Result<()> {
    let (old_idx, old_val) = old;
    let (z_idx, z_val) = z;
    let bound = old_idx.len() + z_idx.len();
    out_idx
        .try_reserve(bound)
        .map_err(|_| Error::out_of_memory())?;
    out_val
        .try_reserve(bound)
        .map_err(|_| Error::out_of_memory())?;

    let (mut i, mut j) = (0, 0);
    while i < old_idx.len() || j < z_idx.len() {
        let pos = match (old_idx.get(i), z_idx.get(j)) {
            (Some(&a), Some(&b)) => a.min(b),
            (Some(&a), None) => a,
            (None, Some(&b)) => b,
            (None, None) => break,
        };
        let in_old = old_idx.get(i) == Some(&pos);
        let in_z = z_idx.get(j) == Some(&pos);

        if mask.allows(pos) {
            if in_z {
                out_idx.push(pos);
                out_val.push(z_val[j]);
            }
        } else if in_old && !replace {
            out_idx.push(pos);
            out_val.push(old_val[i]);
        }

        if in_old {
            i += 1;
        }
        if in_z {
            j += 1;
        }
    }
    Ok(())
}

/// Write a vector result through the output control
pub(crate) fn write_vector<T: Element>(
    out: &mut Vector<T>,
    result: Vector<T>,
    ctl: &VectorOutput<'_>,
) -> Result<()> {
    check_same_shape(out.shape(), result.shape())?;
    if let Some(mask) = ctl.mask {
        check_same_shape(out.shape(), mask.shape())?;
    }
    trace!(
        "write vector nvals={} masked={} accum={:?}",
        result.nvals(),
        !ctl.unmasked(),
        ctl.accum
    );

    let z = match ctl.accum {
        Some(op) => merge_vectors(MergeStrategy::Union, out, &result, |x, y| op.apply(x, y))?,
        None => result,
    };
    if ctl.unmasked() {
        *out = z;
        return Ok(());
    }

    let mask = MaskRow {
        entries: ctl.mask.map(|m| (m.indices(), m.values())),
        structural: ctl.desc.structural_mask,
        complement: ctl.desc.complement_mask,
    };
    let (mut idx, mut val) = (Vec::new(), Vec::new());
    masked_merge(
        (out.indices(), out.values()),
        (z.indices(), z.values()),
        &mask,
        ctl.desc.replace,
        &mut idx,
        &mut val,
    )?;
    *out = Vector::from_sorted_parts(out.size(), idx, val);
    Ok(())
}

/// Write a matrix result through the output control
pub(crate) fn write_matrix<T: Element>(
    out: &mut Matrix<T>,
    result: Matrix<T>,
    ctl: &MatrixOutput<'_>,
) -> Result<()> {
    check_same_shape(out.shape(), result.shape())?;
    if let Some(mask) = ctl.mask {
        check_same_shape(out.shape(), mask.shape())?;
    }
    trace!(
        "write matrix nvals={} masked={} accum={:?}",
        result.nvals(),
        !ctl.unmasked(),
        ctl.accum
    );

    let z = match ctl.accum {
        Some(op) => merge_matrices(MergeStrategy::Union, out, &result, |x, y| op.apply(x, y))?,
        None => result,
    };
    if ctl.unmasked() {
        *out = z;
        return Ok(());
    }

    // Rows absent from both `out` and `z` produce nothing whatever the mask says
    let pairs = pair_rows(MergeStrategy::Union, out.row_ids(), z.row_ids())?;
    let mut rows: Vec<Row<T>> = Vec::new();
    rows.try_reserve(pairs.len())
        .map_err(|_| Error::out_of_memory())?;
    for (row, po, pz) in pairs {
        let old = po.map_or((&[][..], &[][..]), |p| {
            let (_, cols, vals) = out.row_at(p);
            (cols, vals)
        });
        let new = pz.map_or((&[][..], &[][..]), |p| {
            let (_, cols, vals) = z.row_at(p);
            (cols, vals)
        });
        let mask = MaskRow {
            entries: ctl.mask.map(|m| m.row_slices(row)),
            structural: ctl.desc.structural_mask,
            complement: ctl.desc.complement_mask,
        };
        let (mut cols, mut vals) = (Vec::new(), Vec::new());
        masked_merge(old, new, &mask, ctl.desc.replace, &mut cols, &mut vals)?;
        rows.push((row, cols, vals));
    }
    *out = Matrix::from_rows(out.nrows(), out.ncols(), rows)?;
    Ok(())
}
