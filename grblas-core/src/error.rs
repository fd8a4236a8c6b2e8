//! Error types for sparse engine operations

use crate::element::ScalarType;
use thiserror::Error;

/// Shape of a sparse container, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// One-dimensional container of the given size
    Vector(usize),
    /// Two-dimensional container as (nrows, ncols)
    Matrix(usize, usize),
}

impl core::fmt::Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Shape::Vector(n) => write!(f, "[{n}]"),
            Shape::Matrix(r, c) => write!(f, "[{r}x{c}]"),
        }
    }
}

/// Engine status codes
///
/// Numbering follows the GraphBLAS C API so codes stay meaningful when
/// they are logged or handed across a language boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum Info {
    Success = 0,
    NoValue = 1,
    UninitializedObject = -1,
    NullPointer = -2,
    InvalidValue = -3,
    InvalidIndex = -4,
    DomainMismatch = -5,
    DimensionMismatch = -6,
    OutputNotEmpty = -7,
    NotImplemented = -8,
    Panic = -101,
    OutOfMemory = -102,
    InsufficientSpace = -103,
    InvalidObject = -104,
    IndexOutOfBounds = -105,
    EmptyObject = -106,
}

impl Info {
    /// Raw status code
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Decode a raw status code, `None` for codes the engine never emits
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Info::Success,
            1 => Info::NoValue,
            -1 => Info::UninitializedObject,
            -2 => Info::NullPointer,
            -3 => Info::InvalidValue,
            -4 => Info::InvalidIndex,
            -5 => Info::DomainMismatch,
            -6 => Info::DimensionMismatch,
            -7 => Info::OutputNotEmpty,
            -8 => Info::NotImplemented,
            -101 => Info::Panic,
            -102 => Info::OutOfMemory,
            -103 => Info::InsufficientSpace,
            -104 => Info::InvalidObject,
            -105 => Info::IndexOutOfBounds,
            -106 => Info::EmptyObject,
            _ => return None,
        })
    }

    /// True for `Success` and the informational `NoValue`
    pub const fn is_ok(self) -> bool {
        self.code() >= 0
    }

    /// Turn a status into a result, keeping the code of failures
    pub fn check(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::from_info(self))
        }
    }
}

impl core::fmt::Display for Info {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

/// Errors that can occur during sparse engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad shape, size, type or operand at construction or call time
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Index outside the container's current shape
    #[error("index {index} out of bounds for dimension of size {size}")]
    OutOfBounds {
        /// The offending index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Operand shapes are incompatible
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Shape the operation required
        expected: Shape,
        /// Shape that was supplied
        got: Shape,
    },

    /// Operands have different scalar types
    #[error("type mismatch: {lhs} vs {rhs}")]
    TypeMismatch {
        /// Left-hand side type
        lhs: ScalarType,
        /// Right-hand side type
        rhs: ScalarType,
    },

    /// Failure status reported by the execution engine
    #[error("engine failure: {info}")]
    NativeFailure {
        /// Status code preserved for diagnostics
        info: Info,
    },
}

impl Error {
    /// Map a failure status to its typed error
    ///
    /// Status codes that carry no operand detail are kept verbatim in
    /// `NativeFailure`.
    pub fn from_info(info: Info) -> Self {
        match info {
            Info::InvalidValue => Error::InvalidArgument {
                arg: "value",
                reason: "rejected by engine",
            },
            _ => Error::NativeFailure { info },
        }
    }

    /// Status code equivalent of this error
    pub fn info(&self) -> Info {
        match self {
            Error::InvalidArgument { .. } => Info::InvalidValue,
            Error::OutOfBounds { .. } => Info::InvalidIndex,
            Error::ShapeMismatch { .. } => Info::DimensionMismatch,
            Error::TypeMismatch { .. } => Info::DomainMismatch,
            Error::NativeFailure { info } => *info,
        }
    }

    /// Allocation failure
    pub const fn out_of_memory() -> Self {
        Error::NativeFailure {
            info: Info::OutOfMemory,
        }
    }
}

/// Result type for sparse engine operations
pub type Result<T> = core::result::Result<T, Error>;
