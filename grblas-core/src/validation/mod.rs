//! Shape and index validation for sparse containers
//!
//! Pure checks with no storage access. Every public operation runs its
//! checks before building any output, so a failing call leaves its
//! target untouched.

pub mod bounds;

pub use bounds::{check_index, check_same_shape, validate_dimension, INDEX_MAX};
