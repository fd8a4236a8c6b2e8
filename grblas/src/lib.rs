//! grblas - Sparse vectors and matrices over semirings
//!
//! This library provides typed sparse containers and the GraphBLAS-style
//! algebra on top of them: element-wise combination, semiring
//! multiplication, reduction, unary apply, and range-addressed extraction
//! and assignment, each optionally written through a mask and an
//! accumulator.
//!
//! ## Architecture
//!
//! - **grblas-core**: scalar types, operators, semirings, ranges and the
//!   error channel (no container storage, `no_std`)
//! - **grblas**: the containers and the kernels, parallelised with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use grblas::{Matrix, Semiring, Vector};
//!
//! fn example() -> grblas::Result<()> {
//!     // 0 -> 1 -> 2, weighted
//!     let graph = Matrix::from_edge_list(&[0, 1], &[1, 2], &[4.0, 1.5], Some(3), Some(3))?;
//!     let dist = Vector::from_coordinates(&[0], &[0.0], Some(3))?;
//!
//!     // one relaxation step of single-source shortest paths
//!     let step = dist.vxm_semiring(&graph, Semiring::MIN_PLUS)?;
//!     assert_eq!(step.get(1)?, 4.0);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Hypersparse storage**: memory follows the number of stored entries,
//!   not the dimensions
//! - **Masks and accumulators**: every `_into` operation takes an
//!   `OutputControl`
//! - **Deterministic parallelism**: results do not depend on the rayon
//!   thread count
//! - **Run-time typing**: `DynamicVector` / `DynamicMatrix` pick the scalar
//!   type at run time

pub use grblas_core::{
    // Scalars
    Element, Scalar, ScalarType,
    // Operators
    BinaryOp, Monoid, OperatorSet, Semiring, UnaryOp,
    // Addressing
    RangeSpec, INDEX_MAX,
    // Error handling
    Error, Info, Result, Shape,
    // Shape introspection
    SparseShape,
};

pub mod apply;
pub mod assign;
pub mod config;
pub mod descriptor;
pub mod dynamic;
pub mod ewise;
pub mod extract;
mod index;
pub mod matrix;
mod merge;
pub mod mxm;
pub mod output;
pub mod reduce;
mod storage;
pub mod vector;

pub use config::ExecConfig;
pub use descriptor::Descriptor;
pub use dynamic::{DynamicMatrix, DynamicVector};
pub use matrix::Matrix;
pub use output::{MatrixOutput, OutputControl, VectorOutput};
pub use vector::Vector;

#[cfg(feature = "serde")]
pub use matrix::MatrixParts;
#[cfg(feature = "serde")]
pub use vector::VectorParts;
