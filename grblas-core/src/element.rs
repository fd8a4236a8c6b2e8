//! Scalar type registry for sparse containers
//!
//! The engine supports a closed set of scalar types. Each type is
//! described three ways: as a `ScalarType` tag, as a tagged `Scalar`
//! value for run-time typed code, and as a Rust type implementing
//! `Element` for the typed containers.

/// Scalar types a container can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ScalarType {
    Bool = 0,
    Int32 = 1,
    Int64 = 2,
    UInt32 = 3,
    UInt64 = 4,
    Fp32 = 5,
    Fp64 = 6,
}

impl ScalarType {
    /// Every supported type, in tag order
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Bool,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::Fp32,
        ScalarType::Fp64,
    ];

    /// Storage width in bytes
    pub const fn size_bytes(&self) -> usize {
        match self {
            ScalarType::Bool => 1,
            ScalarType::Int32 | ScalarType::UInt32 | ScalarType::Fp32 => 4,
            ScalarType::Int64 | ScalarType::UInt64 | ScalarType::Fp64 => 8,
        }
    }

    /// GraphBLAS-style type name
    pub const fn name(&self) -> &'static str {
        match self {
            ScalarType::Bool => "BOOL",
            ScalarType::Int32 => "INT32",
            ScalarType::Int64 => "INT64",
            ScalarType::UInt32 => "UINT32",
            ScalarType::UInt64 => "UINT64",
            ScalarType::Fp32 => "FP32",
            ScalarType::Fp64 => "FP64",
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, ScalarType::Fp32 | ScalarType::Fp64)
    }

    pub const fn is_integer(&self) -> bool {
        !self.is_float() && !matches!(self, ScalarType::Bool)
    }
}

impl core::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::Int32 => write!(f, "i32"),
            ScalarType::Int64 => write!(f, "i64"),
            ScalarType::UInt32 => write!(f, "u32"),
            ScalarType::UInt64 => write!(f, "u64"),
            ScalarType::Fp32 => write!(f, "f32"),
            ScalarType::Fp64 => write!(f, "f64"),
        }
    }
}

/// A single value tagged with its scalar type
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Fp32(f32),
    Fp64(f64),
}

impl Scalar {
    /// Type tag of this value
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::Int32(_) => ScalarType::Int32,
            Scalar::Int64(_) => ScalarType::Int64,
            Scalar::UInt32(_) => ScalarType::UInt32,
            Scalar::UInt64(_) => ScalarType::UInt64,
            Scalar::Fp32(_) => ScalarType::Fp32,
            Scalar::Fp64(_) => ScalarType::Fp64,
        }
    }

    /// The implicit value of absent entries for a type
    pub fn zero(scalar_type: ScalarType) -> Self {
        match scalar_type {
            ScalarType::Bool => Scalar::Bool(false),
            ScalarType::Int32 => Scalar::Int32(0),
            ScalarType::Int64 => Scalar::Int64(0),
            ScalarType::UInt32 => Scalar::UInt32(0),
            ScalarType::UInt64 => Scalar::UInt64(0),
            ScalarType::Fp32 => Scalar::Fp32(0.0),
            ScalarType::Fp64 => Scalar::Fp64(0.0),
        }
    }

    /// Typecast to bool (non-zero is true)
    pub fn as_bool(&self) -> bool {
        bool::cast_from(*self)
    }

    /// Typecast to i64
    pub fn as_i64(&self) -> i64 {
        i64::cast_from(*self)
    }

    /// Typecast to f64
    pub fn as_f64(&self) -> f64 {
        f64::cast_from(*self)
    }

    /// Typecast to another scalar type
    pub fn cast(&self, to: ScalarType) -> Scalar {
        match to {
            ScalarType::Bool => Scalar::Bool(bool::cast_from(*self)),
            ScalarType::Int32 => Scalar::Int32(i32::cast_from(*self)),
            ScalarType::Int64 => Scalar::Int64(i64::cast_from(*self)),
            ScalarType::UInt32 => Scalar::UInt32(u32::cast_from(*self)),
            ScalarType::UInt64 => Scalar::UInt64(u64::cast_from(*self)),
            ScalarType::Fp32 => Scalar::Fp32(f32::cast_from(*self)),
            ScalarType::Fp64 => Scalar::Fp64(f64::cast_from(*self)),
        }
    }
}

impl core::fmt::Display for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Fp32(v) => write!(f, "{v}"),
            Scalar::Fp64(v) => write!(f, "{v}"),
        }
    }
}

/// Trait for types that can be stored in sparse containers
///
/// The arithmetic methods define what the built-in operators mean for
/// each type. They never panic: integer arithmetic wraps and integer
/// division by zero saturates the way GraphBLAS defines it.
pub trait Element:
    Copy + PartialEq + PartialOrd + core::fmt::Debug + Send + Sync + 'static
{
    /// Type tag for this element type
    const SCALAR_TYPE: ScalarType;

    /// Implicit value of an absent entry
    fn zero() -> Self;

    fn one() -> Self;

    /// Smallest representable value (identity of MAX)
    fn lowest() -> Self;

    /// Largest representable value (identity of MIN)
    fn highest() -> Self;

    fn plus(self, rhs: Self) -> Self;

    fn minus(self, rhs: Self) -> Self;

    fn times(self, rhs: Self) -> Self;

    fn div(self, rhs: Self) -> Self;

    fn pick_min(self, rhs: Self) -> Self {
        if rhs < self {
            rhs
        } else {
            self
        }
    }

    fn pick_max(self, rhs: Self) -> Self {
        if rhs > self {
            rhs
        } else {
            self
        }
    }

    /// Additive inverse
    fn ainv(self) -> Self;

    /// Multiplicative inverse
    fn minv(self) -> Self;

    fn abs(self) -> Self;

    /// Truth value used by logical operators and value masks
    fn is_true(self) -> bool;

    fn from_bool(value: bool) -> Self;

    /// Wrap in a tagged scalar
    fn to_scalar(self) -> Scalar;

    /// Unwrap a tagged scalar of exactly this type
    fn from_scalar(value: Scalar) -> Option<Self>;

    /// Convert a tagged scalar of any type with GraphBLAS typecasting
    fn cast_from(value: Scalar) -> Self;
}

impl Element for bool {
    const SCALAR_TYPE: ScalarType = ScalarType::Bool;

    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    fn lowest() -> Self {
        false
    }

    fn highest() -> Self {
        true
    }

    fn plus(self, rhs: Self) -> Self {
        self | rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self ^ rhs
    }

    fn times(self, rhs: Self) -> Self {
        self & rhs
    }

    fn div(self, _rhs: Self) -> Self {
        self
    }

    fn ainv(self) -> Self {
        self
    }

    fn minv(self) -> Self {
        true
    }

    fn abs(self) -> Self {
        self
    }

    fn is_true(self) -> bool {
        self
    }

    fn from_bool(value: bool) -> Self {
        value
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Bool(v) => Some(v),
            _ => None,
        }
    }

    fn cast_from(value: Scalar) -> Self {
        match value {
            Scalar::Bool(v) => v,
            Scalar::Int32(v) => v != 0,
            Scalar::Int64(v) => v != 0,
            Scalar::UInt32(v) => v != 0,
            Scalar::UInt64(v) => v != 0,
            Scalar::Fp32(v) => v != 0.0,
            Scalar::Fp64(v) => v != 0.0,
        }
    }
}

/// Conversion shared by the numeric impls
macro_rules! numeric_cast_from {
    ($type:ty) => {
        fn cast_from(value: Scalar) -> Self {
            match value {
                Scalar::Bool(v) => v as u8 as $type,
                Scalar::Int32(v) => v as $type,
                Scalar::Int64(v) => v as $type,
                Scalar::UInt32(v) => v as $type,
                Scalar::UInt64(v) => v as $type,
                Scalar::Fp32(v) => v as $type,
                Scalar::Fp64(v) => v as $type,
            }
        }
    };
}

macro_rules! impl_signed_element {
    ($type:ty, $variant:ident) => {
        impl Element for $type {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            fn zero() -> Self {
                0
            }

            fn one() -> Self {
                1
            }

            fn lowest() -> Self {
                <$type>::MIN
            }

            fn highest() -> Self {
                <$type>::MAX
            }

            fn plus(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn minus(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn times(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    match self {
                        0 => 0,
                        x if x > 0 => <$type>::MAX,
                        _ => <$type>::MIN,
                    }
                } else {
                    self.wrapping_div(rhs)
                }
            }

            fn ainv(self) -> Self {
                self.wrapping_neg()
            }

            fn minv(self) -> Self {
                Self::one().div(self)
            }

            fn abs(self) -> Self {
                self.wrapping_abs()
            }

            fn is_true(self) -> bool {
                self != 0
            }

            fn from_bool(value: bool) -> Self {
                value as $type
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            numeric_cast_from!($type);
        }
    };
}

macro_rules! impl_unsigned_element {
    ($type:ty, $variant:ident) => {
        impl Element for $type {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            fn zero() -> Self {
                0
            }

            fn one() -> Self {
                1
            }

            fn lowest() -> Self {
                0
            }

            fn highest() -> Self {
                <$type>::MAX
            }

            fn plus(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn minus(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn times(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn div(self, rhs: Self) -> Self {
                if rhs == 0 {
                    if self == 0 {
                        0
                    } else {
                        <$type>::MAX
                    }
                } else {
                    self / rhs
                }
            }

            fn ainv(self) -> Self {
                self.wrapping_neg()
            }

            fn minv(self) -> Self {
                Self::one().div(self)
            }

            fn abs(self) -> Self {
                self
            }

            fn is_true(self) -> bool {
                self != 0
            }

            fn from_bool(value: bool) -> Self {
                value as $type
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            numeric_cast_from!($type);
        }
    };
}

macro_rules! impl_float_element {
    ($type:ty, $variant:ident) => {
        impl Element for $type {
            const SCALAR_TYPE: ScalarType = ScalarType::$variant;

            fn zero() -> Self {
                0.0
            }

            fn one() -> Self {
                1.0
            }

            fn lowest() -> Self {
                <$type>::NEG_INFINITY
            }

            fn highest() -> Self {
                <$type>::INFINITY
            }

            fn plus(self, rhs: Self) -> Self {
                self + rhs
            }

            fn minus(self, rhs: Self) -> Self {
                self - rhs
            }

            fn times(self, rhs: Self) -> Self {
                self * rhs
            }

            fn div(self, rhs: Self) -> Self {
                self / rhs
            }

            // fmin/fmax semantics: a NaN operand loses
            fn pick_min(self, rhs: Self) -> Self {
                if self.is_nan() || rhs < self {
                    rhs
                } else {
                    self
                }
            }

            fn pick_max(self, rhs: Self) -> Self {
                if self.is_nan() || rhs > self {
                    rhs
                } else {
                    self
                }
            }

            fn ainv(self) -> Self {
                -self
            }

            fn minv(self) -> Self {
                1.0 / self
            }

            fn abs(self) -> Self {
                if self < 0.0 {
                    -self
                } else {
                    self
                }
            }

            fn is_true(self) -> bool {
                self != 0.0
            }

            fn from_bool(value: bool) -> Self {
                value as u8 as $type
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            numeric_cast_from!($type);
        }
    };
}

impl_signed_element!(i32, Int32);
impl_signed_element!(i64, Int64);
impl_unsigned_element!(u32, UInt32);
impl_unsigned_element!(u64, UInt64);
impl_float_element!(f32, Fp32);
impl_float_element!(f64, Fp64);

macro_rules! impl_scalar_from {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Scalar {
            fn from(value: $type) -> Self {
                Scalar::$variant(value)
            }
        }
    };
}

impl_scalar_from!(bool, Bool);
impl_scalar_from!(i32, Int32);
impl_scalar_from!(i64, Int64);
impl_scalar_from!(u32, UInt32);
impl_scalar_from!(u64, UInt64);
impl_scalar_from!(f32, Fp32);
impl_scalar_from!(f64, Fp64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_sizes() {
        assert_eq!(ScalarType::Bool.size_bytes(), 1);
        assert_eq!(ScalarType::Int64.size_bytes(), 8);
        assert_eq!(ScalarType::Fp32.size_bytes(), 4);
        assert_eq!(i64::SCALAR_TYPE, ScalarType::Int64);
    }

    #[test]
    fn test_bool_arithmetic() {
        assert!(true.plus(false));
        assert!(!true.times(false));
        assert!(!true.minus(true));
        assert!(!bool::zero());
    }

    #[test]
    fn test_integer_division_by_zero_saturates() {
        assert_eq!(7i64.div(0), i64::MAX);
        assert_eq!((-7i64).div(0), i64::MIN);
        assert_eq!(0i64.div(0), 0);
        assert_eq!(7u32.div(0), u32::MAX);
        assert_eq!(i32::MIN.div(-1), i32::MIN);
    }

    #[test]
    fn test_float_min_ignores_nan() {
        assert_eq!(f64::NAN.pick_min(2.0), 2.0);
        assert_eq!(3.0f64.pick_max(f64::NAN), 3.0);
        assert_eq!(1.5f32.pick_min(-2.0), -2.0);
    }

    #[test]
    fn test_scalar_casts() {
        let s = Scalar::Fp64(3.75);
        assert_eq!(s.as_i64(), 3);
        assert!(s.as_bool());
        assert_eq!(Scalar::Bool(true).as_f64(), 1.0);
        assert_eq!(Scalar::Int32(-2).cast(ScalarType::Fp32), Scalar::Fp32(-2.0));
        assert_eq!(i64::from_scalar(Scalar::Int64(9)), Some(9));
        assert_eq!(i64::from_scalar(Scalar::Int32(9)), None);
    }
}
