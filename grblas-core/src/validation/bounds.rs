//! Index bounds and dimension validation

use crate::error::{Error, Result, Shape};

/// Largest dimension a container may have (2^60, as in GraphBLAS)
pub const INDEX_MAX: usize = 1 << 60;

/// Validate a dimension requested at construction or resize
pub const fn validate_dimension(arg: &'static str, size: usize) -> Result<usize> {
    if size > INDEX_MAX {
        return Err(Error::InvalidArgument {
            arg,
            reason: "dimension exceeds INDEX_MAX",
        });
    }
    Ok(size)
}

/// Validate that an index addresses a position inside a dimension
#[inline]
pub const fn check_index(index: usize, size: usize) -> Result<()> {
    if index >= size {
        return Err(Error::OutOfBounds { index, size });
    }
    Ok(())
}

/// Validate that two operands have identical shapes
pub fn check_same_shape(expected: Shape, got: Shape) -> Result<()> {
    if expected != got {
        return Err(Error::ShapeMismatch { expected, got });
    }
    Ok(())
}
