//! Unary and binary operator tables
//!
//! Operators are closed enums evaluated generically over `Element`, so a
//! container resolves its operator set once from its element type instead
//! of looking it up per call.

use crate::element::Element;

/// Unary operators used by `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// f(x) = x
    Identity,
    /// f(x) = -x
    AInv,
    /// f(x) = 1/x
    MInv,
    /// f(x) = |x|
    Abs,
    /// f(x) = !x, on the truth value of x
    LNot,
    /// f(x) = 1
    One,
}

impl UnaryOp {
    /// Evaluate the operator
    #[inline]
    pub fn apply<T: Element>(self, x: T) -> T {
        match self {
            UnaryOp::Identity => x,
            UnaryOp::AInv => x.ainv(),
            UnaryOp::MInv => x.minv(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::LNot => T::from_bool(!x.is_true()),
            UnaryOp::One => T::one(),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            UnaryOp::Identity => "IDENTITY",
            UnaryOp::AInv => "AINV",
            UnaryOp::MInv => "MINV",
            UnaryOp::Abs => "ABS",
            UnaryOp::LNot => "LNOT",
            UnaryOp::One => "ONE",
        }
    }
}

/// Binary operators used by element-wise operations, accumulators and
/// the multiplicative half of a semiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    /// f(x, y) = x
    First,
    /// f(x, y) = y
    Second,
    /// f(x, y) = 1
    Pair,
    Plus,
    Minus,
    Times,
    Div,
    Min,
    Max,
    LOr,
    LAnd,
    LXor,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl BinaryOp {
    /// Evaluate the operator
    ///
    /// Comparison and logical operators return their truth value in the
    /// operand type (1 or 0, true or false).
    #[inline]
    pub fn apply<T: Element>(self, x: T, y: T) -> T {
        match self {
            BinaryOp::First => x,
            BinaryOp::Second => y,
            BinaryOp::Pair => T::one(),
            BinaryOp::Plus => x.plus(y),
            BinaryOp::Minus => x.minus(y),
            BinaryOp::Times => x.times(y),
            BinaryOp::Div => x.div(y),
            BinaryOp::Min => x.pick_min(y),
            BinaryOp::Max => x.pick_max(y),
            BinaryOp::LOr => T::from_bool(x.is_true() || y.is_true()),
            BinaryOp::LAnd => T::from_bool(x.is_true() && y.is_true()),
            BinaryOp::LXor => T::from_bool(x.is_true() != y.is_true()),
            BinaryOp::Eq => T::from_bool(x == y),
            BinaryOp::Ne => T::from_bool(x != y),
            BinaryOp::Gt => T::from_bool(x > y),
            BinaryOp::Lt => T::from_bool(x < y),
            BinaryOp::Ge => T::from_bool(x >= y),
            BinaryOp::Le => T::from_bool(x <= y),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            BinaryOp::First => "FIRST",
            BinaryOp::Second => "SECOND",
            BinaryOp::Pair => "PAIR",
            BinaryOp::Plus => "PLUS",
            BinaryOp::Minus => "MINUS",
            BinaryOp::Times => "TIMES",
            BinaryOp::Div => "DIV",
            BinaryOp::Min => "MIN",
            BinaryOp::Max => "MAX",
            BinaryOp::LOr => "LOR",
            BinaryOp::LAnd => "LAND",
            BinaryOp::LXor => "LXOR",
            BinaryOp::Eq => "EQ",
            BinaryOp::Ne => "NE",
            BinaryOp::Gt => "GT",
            BinaryOp::Lt => "LT",
            BinaryOp::Ge => "GE",
            BinaryOp::Le => "LE",
        }
    }
}

impl core::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
