//! Monoids and semirings
//!
//! A semiring (⊕, ⊗) pairs an additive monoid with a multiplicative
//! operator:
//! - ⊕ is associative and commutative, with an identity element
//! - ⊗ combines one entry of each operand
//!
//! | Semiring     | ⊕ (Add) | ⊗ (Multiply) | Use case                 |
//! |--------------|---------|--------------|--------------------------|
//! | PLUS_TIMES   | Plus    | Times        | Conventional arithmetic  |
//! | LOR_LAND     | LOr     | LAnd         | Reachability             |
//! | MIN_PLUS     | Min     | Plus         | Shortest path            |
//! | MAX_TIMES    | Max     | Times        | Most reliable path       |
//! | MIN_FIRST    | Min     | First        | Parent selection in BFS  |
//! | PLUS_PAIR    | Plus    | Pair         | Counting paths           |

use crate::element::{Element, ScalarType};
use crate::ops::BinaryOp;

/// Associative, commutative operator with an identity element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Monoid {
    Plus,
    Times,
    Min,
    Max,
    LOr,
    LAnd,
    LXor,
}

impl Monoid {
    /// The binary operator of this monoid
    pub const fn op(&self) -> BinaryOp {
        match self {
            Monoid::Plus => BinaryOp::Plus,
            Monoid::Times => BinaryOp::Times,
            Monoid::Min => BinaryOp::Min,
            Monoid::Max => BinaryOp::Max,
            Monoid::LOr => BinaryOp::LOr,
            Monoid::LAnd => BinaryOp::LAnd,
            Monoid::LXor => BinaryOp::LXor,
        }
    }

    /// Identity element for the given element type
    pub fn identity<T: Element>(&self) -> T {
        match self {
            Monoid::Plus => T::zero(),
            Monoid::Times => T::one(),
            Monoid::Min => T::highest(),
            Monoid::Max => T::lowest(),
            Monoid::LOr | Monoid::LXor => T::from_bool(false),
            Monoid::LAnd => T::from_bool(true),
        }
    }

    #[inline]
    pub fn combine<T: Element>(&self, x: T, y: T) -> T {
        self.op().apply(x, y)
    }

    /// Fold values through the monoid, seeded with its identity
    pub fn fold<T: Element, I: IntoIterator<Item = T>>(&self, values: I) -> T {
        values
            .into_iter()
            .fold(self.identity(), |acc, x| self.combine(acc, x))
    }

    pub const fn name(&self) -> &'static str {
        self.op().name()
    }
}

/// Additive monoid plus multiplicative operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Semiring {
    /// ⊕, accumulates partial products
    pub add: Monoid,
    /// ⊗, forms partial products
    pub mul: BinaryOp,
}

impl Semiring {
    pub const PLUS_TIMES: Semiring = Semiring::new(Monoid::Plus, BinaryOp::Times);
    pub const LOR_LAND: Semiring = Semiring::new(Monoid::LOr, BinaryOp::LAnd);
    pub const MIN_PLUS: Semiring = Semiring::new(Monoid::Min, BinaryOp::Plus);
    pub const MAX_PLUS: Semiring = Semiring::new(Monoid::Max, BinaryOp::Plus);
    pub const MIN_TIMES: Semiring = Semiring::new(Monoid::Min, BinaryOp::Times);
    pub const MAX_TIMES: Semiring = Semiring::new(Monoid::Max, BinaryOp::Times);
    pub const MIN_FIRST: Semiring = Semiring::new(Monoid::Min, BinaryOp::First);
    pub const MIN_SECOND: Semiring = Semiring::new(Monoid::Min, BinaryOp::Second);
    pub const PLUS_PAIR: Semiring = Semiring::new(Monoid::Plus, BinaryOp::Pair);

    pub const fn new(add: Monoid, mul: BinaryOp) -> Self {
        Self { add, mul }
    }

    /// Additive identity (the implicit value of absent cells)
    pub fn zero<T: Element>(&self) -> T {
        self.add.identity()
    }

    #[inline]
    pub fn add<T: Element>(&self, x: T, y: T) -> T {
        self.add.combine(x, y)
    }

    #[inline]
    pub fn multiply<T: Element>(&self, x: T, y: T) -> T {
        self.mul.apply(x, y)
    }
}

impl Default for Semiring {
    fn default() -> Self {
        Semiring::PLUS_TIMES
    }
}

impl core::fmt::Display for Semiring {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}_{}", self.add.name(), self.mul.name())
    }
}

/// Default operators carried by each scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSet {
    /// Element-wise add operator
    pub add: BinaryOp,
    /// Element-wise multiply operator
    pub mult: BinaryOp,
    /// Reduction monoid
    pub monoid: Monoid,
    /// Multiplication semiring
    pub semiring: Semiring,
}

const BOOL_OPERATORS: OperatorSet = OperatorSet {
    add: BinaryOp::LOr,
    mult: BinaryOp::LAnd,
    monoid: Monoid::LOr,
    semiring: Semiring::LOR_LAND,
};

const NUMERIC_OPERATORS: OperatorSet = OperatorSet {
    add: BinaryOp::Plus,
    mult: BinaryOp::Times,
    monoid: Monoid::Plus,
    semiring: Semiring::PLUS_TIMES,
};

impl ScalarType {
    /// Default operator set for containers of this type
    pub const fn operators(&self) -> OperatorSet {
        match self {
            ScalarType::Bool => BOOL_OPERATORS,
            _ => NUMERIC_OPERATORS,
        }
    }
}
