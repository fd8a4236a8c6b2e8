#![no_std]

//! grblas-core - Scalar, operator and range definitions for sparse semiring algebra
//!
//! This crate provides the pure definitions shared by the sparse engine:
//! the closed set of scalar types, the operator tables (unary, binary,
//! monoid, semiring), range descriptors and the typed error channel.
//! Nothing here owns container storage.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod element;
pub mod error;
pub mod ops;
pub mod range;
pub mod semiring;
pub mod validation;

pub use element::*;
pub use error::*;
pub use ops::{BinaryOp, UnaryOp};
pub use range::RangeSpec;
pub use semiring::{Monoid, OperatorSet, Semiring};
pub use validation::{check_index, check_same_shape, validate_dimension, INDEX_MAX};

/// Format-agnostic view of a sparse container's shape and population
pub trait SparseShape {
    /// Shape of the container
    fn shape(&self) -> Shape;

    /// Number of stored entries
    fn nvals(&self) -> usize;

    /// Scalar type fixed at creation
    fn scalar_type(&self) -> ScalarType;
}
