//! Run-time typed containers
//!
//! `DynamicVector` and `DynamicMatrix` hold one typed container behind a
//! closed enum so callers can pick the scalar type at run time. Binary
//! operations require both operands to hold the same type and fail with
//! `TypeMismatch` otherwise; nothing is promoted implicitly. Values cross
//! the boundary as tagged `Scalar`s.

use grblas_core::{
    Element, Error, Monoid, RangeSpec, Result, Scalar, ScalarType, Shape, SparseShape, UnaryOp,
};

use crate::matrix::Matrix;
use crate::storage::{try_to_vec, try_with_capacity};
use crate::vector::Vector;

/// Sparse vector whose scalar type is chosen at run time
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicVector {
    Bool(Vector<bool>),
    Int32(Vector<i32>),
    Int64(Vector<i64>),
    UInt32(Vector<u32>),
    UInt64(Vector<u64>),
    Fp32(Vector<f32>),
    Fp64(Vector<f64>),
}

/// Sparse matrix whose scalar type is chosen at run time
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicMatrix {
    Bool(Matrix<bool>),
    Int32(Matrix<i32>),
    Int64(Matrix<i64>),
    UInt32(Matrix<u32>),
    UInt64(Matrix<u64>),
    Fp32(Matrix<f32>),
    Fp64(Matrix<f64>),
}

/// Run `$body` against whichever typed container `$value` holds
macro_rules! with_typed {
    ($enum:ident, $value:expr, $inner:ident => $body:expr) => {
        match $value {
            $enum::Bool($inner) => $body,
            $enum::Int32($inner) => $body,
            $enum::Int64($inner) => $body,
            $enum::UInt32($inner) => $body,
            $enum::UInt64($inner) => $body,
            $enum::Fp32($inner) => $body,
            $enum::Fp64($inner) => $body,
        }
    };
}

/// Like `with_typed!`, rewrapping a fallible result in the `$out` enum
macro_rules! map_typed {
    ($enum:ident => $out:ident, $value:expr, $inner:ident => $body:expr) => {
        match $value {
            $enum::Bool($inner) => $out::Bool($body?),
            $enum::Int32($inner) => $out::Int32($body?),
            $enum::Int64($inner) => $out::Int64($body?),
            $enum::UInt32($inner) => $out::UInt32($body?),
            $enum::UInt64($inner) => $out::UInt64($body?),
            $enum::Fp32($inner) => $out::Fp32($body?),
            $enum::Fp64($inner) => $out::Fp64($body?),
        }
    };
}

/// Pair two operands of the same scalar type; differing types fail
macro_rules! zip_typed {
    ($lhs_enum:ident, $rhs_enum:ident => $out:ident, $lhs:expr, $rhs:expr,
     |$a:ident, $b:ident| $body:expr) => {
        match ($lhs, $rhs) {
            ($lhs_enum::Bool($a), $rhs_enum::Bool($b)) => Ok($out::Bool($body?)),
            ($lhs_enum::Int32($a), $rhs_enum::Int32($b)) => Ok($out::Int32($body?)),
            ($lhs_enum::Int64($a), $rhs_enum::Int64($b)) => Ok($out::Int64($body?)),
            ($lhs_enum::UInt32($a), $rhs_enum::UInt32($b)) => Ok($out::UInt32($body?)),
            ($lhs_enum::UInt64($a), $rhs_enum::UInt64($b)) => Ok($out::UInt64($body?)),
            ($lhs_enum::Fp32($a), $rhs_enum::Fp32($b)) => Ok($out::Fp32($body?)),
            ($lhs_enum::Fp64($a), $rhs_enum::Fp64($b)) => Ok($out::Fp64($body?)),
            (a, b) => Err(Error::TypeMismatch {
                lhs: a.scalar_type(),
                rhs: b.scalar_type(),
            }),
        }
    };
}

/// Build the `$enum` variant for a run-time `ScalarType`, with `$t`
/// bound to the matching Rust type inside `$body`
macro_rules! build_typed {
    ($enum:ident, $ty:expr, $t:ident => $body:expr) => {
        match $ty {
            ScalarType::Bool => {
                type $t = bool;
                $enum::Bool($body?)
            }
            ScalarType::Int32 => {
                type $t = i32;
                $enum::Int32($body?)
            }
            ScalarType::Int64 => {
                type $t = i64;
                $enum::Int64($body?)
            }
            ScalarType::UInt32 => {
                type $t = u32;
                $enum::UInt32($body?)
            }
            ScalarType::UInt64 => {
                type $t = u64;
                $enum::UInt64($body?)
            }
            ScalarType::Fp32 => {
                type $t = f32;
                $enum::Fp32($body?)
            }
            ScalarType::Fp64 => {
                type $t = f64;
                $enum::Fp64($body?)
            }
        }
    };
}

/// Unwrap tagged scalars that must all carry `T`'s type
fn typed_values<T: Element>(values: &[Scalar]) -> Result<Vec<T>> {
    let mut out = try_with_capacity(values.len())?;
    for value in values {
        let typed = T::from_scalar(*value).ok_or(Error::TypeMismatch {
            lhs: T::SCALAR_TYPE,
            rhs: value.scalar_type(),
        })?;
        out.push(typed);
    }
    Ok(out)
}

/// Scalar type of the first value, which every other value must share
fn infer_type(values: &[Scalar]) -> Result<ScalarType> {
    values
        .first()
        .map(Scalar::scalar_type)
        .ok_or(Error::InvalidArgument {
            arg: "values",
            reason: "cannot infer a type from an empty value list",
        })
}

fn scalars<T: Element>(values: &[T]) -> Result<Vec<Scalar>> {
    let mut out = try_with_capacity(values.len())?;
    out.extend(values.iter().map(|v| v.to_scalar()));
    Ok(out)
}

impl DynamicVector {
    /// Empty vector of the given type and size
    pub fn from_type(scalar_type: ScalarType, size: usize) -> Result<Self> {
        Ok(build_typed!(DynamicVector, scalar_type, T => Vector::<T>::new(size)))
    }

    /// Build from coordinate lists; the type comes from the values, which
    /// must all share one type
    pub fn from_coordinates(
        indices: &[usize],
        values: &[Scalar],
        size: Option<usize>,
    ) -> Result<Self> {
        let scalar_type = infer_type(values)?;
        Ok(build_typed!(DynamicVector, scalar_type, T => {
            Vector::<T>::from_coordinates(indices, &typed_values::<T>(values)?, size)
        }))
    }

    /// Dense build from a value list
    pub fn from_list(values: &[Scalar]) -> Result<Self> {
        let scalar_type = infer_type(values)?;
        Ok(build_typed!(DynamicVector, scalar_type, T => {
            Vector::<T>::from_list(&typed_values::<T>(values)?)
        }))
    }

    pub fn scalar_type(&self) -> ScalarType {
        with_typed!(DynamicVector, self, v => v.scalar_type())
    }

    pub fn size(&self) -> usize {
        with_typed!(DynamicVector, self, v => v.size())
    }

    pub fn nvals(&self) -> usize {
        with_typed!(DynamicVector, self, v => v.nvals())
    }

    /// Stored value at `index`, `None` when absent
    pub fn try_get(&self, index: usize) -> Result<Option<Scalar>> {
        with_typed!(DynamicVector, self, v => Ok(v.try_get(index)?.map(|x| x.to_scalar())))
    }

    /// Value at `index`, the type's zero when absent
    pub fn get(&self, index: usize) -> Result<Scalar> {
        with_typed!(DynamicVector, self, v => Ok(v.get(index)?.to_scalar()))
    }

    /// Store `value`, typecast to the vector's type
    pub fn set(&mut self, index: usize, value: Scalar) -> Result<()> {
        with_typed!(DynamicVector, self, v => v.set(index, Element::cast_from(value)))
    }

    pub fn remove(&mut self, index: usize) -> Result<Option<Scalar>> {
        with_typed!(DynamicVector, self, v => Ok(v.remove(index)?.map(|x| x.to_scalar())))
    }

    pub fn clear(&mut self) {
        with_typed!(DynamicVector, self, v => v.clear())
    }

    pub fn to_coordinate_lists(&self) -> Result<(Vec<usize>, Vec<Scalar>)> {
        with_typed!(DynamicVector, self, v => Ok((try_to_vec(v.indices())?, scalars(v.values())?)))
    }

    /// Union combine with the type's default add operator
    pub fn ewise_add(&self, other: &Self) -> Result<Self> {
        zip_typed!(DynamicVector, DynamicVector => DynamicVector, self, other, |a, b| a.ewise_add(b))
    }

    /// Intersection combine with the type's default multiply operator
    pub fn ewise_mult(&self, other: &Self) -> Result<Self> {
        zip_typed!(DynamicVector, DynamicVector => DynamicVector, self, other, |a, b| a.ewise_mult(b))
    }

    /// Row-vector product with the type's default semiring
    pub fn vxm(&self, m: &DynamicMatrix) -> Result<Self> {
        zip_typed!(DynamicVector, DynamicMatrix => DynamicVector, self, m, |v, m| v.vxm(m))
    }

    pub fn apply(&self, op: UnaryOp) -> Result<Self> {
        Ok(map_typed!(DynamicVector => DynamicVector, self, v => v.apply(op)))
    }

    pub fn extract(&self, range: &RangeSpec) -> Result<Self> {
        Ok(map_typed!(DynamicVector => DynamicVector, self, v => v.extract(range)))
    }

    /// Copy with every value typecast to `to`
    pub fn cast(&self, to: ScalarType) -> Result<Self> {
        with_typed!(DynamicVector, self, v => {
            Ok(build_typed!(DynamicVector, to, T => v.cast::<T>()))
        })
    }

    /// Logical OR of the stored values, each typecast to bool
    pub fn reduce_bool(&self) -> Result<bool> {
        with_typed!(DynamicVector, self, v => Ok(v.cast::<bool>()?.reduce_monoid(Monoid::LOr)))
    }

    /// Sum of the stored values, each typecast to i64
    pub fn reduce_int(&self) -> Result<i64> {
        with_typed!(DynamicVector, self, v => Ok(v.cast::<i64>()?.reduce_monoid(Monoid::Plus)))
    }

    /// Sum of the stored values, each typecast to f64
    pub fn reduce_float(&self) -> Result<f64> {
        with_typed!(DynamicVector, self, v => Ok(v.cast::<f64>()?.reduce_monoid(Monoid::Plus)))
    }
}

impl SparseShape for DynamicVector {
    fn shape(&self) -> Shape {
        Shape::Vector(self.size())
    }

    fn nvals(&self) -> usize {
        DynamicVector::nvals(self)
    }

    fn scalar_type(&self) -> ScalarType {
        DynamicVector::scalar_type(self)
    }
}

impl DynamicMatrix {
    /// Empty matrix of the given type and shape
    pub fn from_type(scalar_type: ScalarType, nrows: usize, ncols: usize) -> Result<Self> {
        Ok(build_typed!(DynamicMatrix, scalar_type, T => Matrix::<T>::new(nrows, ncols)))
    }

    /// Build from an edge list; the type comes from the values
    pub fn from_edge_list(
        rows: &[usize],
        cols: &[usize],
        values: &[Scalar],
        nrows: Option<usize>,
        ncols: Option<usize>,
    ) -> Result<Self> {
        let scalar_type = infer_type(values)?;
        Ok(build_typed!(DynamicMatrix, scalar_type, T => {
            Matrix::<T>::from_edge_list(rows, cols, &typed_values::<T>(values)?, nrows, ncols)
        }))
    }

    pub fn scalar_type(&self) -> ScalarType {
        with_typed!(DynamicMatrix, self, m => m.scalar_type())
    }

    pub fn nrows(&self) -> usize {
        with_typed!(DynamicMatrix, self, m => m.nrows())
    }

    pub fn ncols(&self) -> usize {
        with_typed!(DynamicMatrix, self, m => m.ncols())
    }

    pub fn nvals(&self) -> usize {
        with_typed!(DynamicMatrix, self, m => m.nvals())
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<Option<Scalar>> {
        with_typed!(DynamicMatrix, self, m => Ok(m.try_get(row, col)?.map(|x| x.to_scalar())))
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Scalar> {
        with_typed!(DynamicMatrix, self, m => Ok(m.get(row, col)?.to_scalar()))
    }

    /// Store `value`, typecast to the matrix's type
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) -> Result<()> {
        with_typed!(DynamicMatrix, self, m => m.set(row, col, Element::cast_from(value)))
    }

    pub fn remove(&mut self, row: usize, col: usize) -> Result<Option<Scalar>> {
        with_typed!(DynamicMatrix, self, m => Ok(m.remove(row, col)?.map(|x| x.to_scalar())))
    }

    pub fn clear(&mut self) {
        with_typed!(DynamicMatrix, self, m => m.clear())
    }

    pub fn to_coordinate_lists(&self) -> Result<(Vec<usize>, Vec<usize>, Vec<Scalar>)> {
        with_typed!(DynamicMatrix, self, m => {
            let (rows, cols, vals) = m.to_coordinate_lists()?;
            Ok((rows, cols, scalars(&vals)?))
        })
    }

    pub fn ewise_add(&self, other: &Self) -> Result<Self> {
        zip_typed!(DynamicMatrix, DynamicMatrix => DynamicMatrix, self, other, |a, b| a.ewise_add(b))
    }

    pub fn ewise_mult(&self, other: &Self) -> Result<Self> {
        zip_typed!(DynamicMatrix, DynamicMatrix => DynamicMatrix, self, other, |a, b| a.ewise_mult(b))
    }

    /// Matrix product with the type's default semiring
    pub fn mxm(&self, other: &Self) -> Result<Self> {
        zip_typed!(DynamicMatrix, DynamicMatrix => DynamicMatrix, self, other, |a, b| a.mxm(b))
    }

    /// Column-vector product with the type's default semiring
    pub fn mxv(&self, u: &DynamicVector) -> Result<DynamicVector> {
        zip_typed!(DynamicMatrix, DynamicVector => DynamicVector, self, u, |m, u| m.mxv(u))
    }

    pub fn transpose(&self) -> Result<Self> {
        Ok(map_typed!(DynamicMatrix => DynamicMatrix, self, m => m.transpose()))
    }

    pub fn apply(&self, op: UnaryOp) -> Result<Self> {
        Ok(map_typed!(DynamicMatrix => DynamicMatrix, self, m => m.apply(op)))
    }

    pub fn extract(&self, rows: &RangeSpec, cols: &RangeSpec) -> Result<Self> {
        Ok(map_typed!(DynamicMatrix => DynamicMatrix, self, m => m.extract(rows, cols)))
    }

    pub fn extract_row(&self, row: usize, cols: &RangeSpec) -> Result<DynamicVector> {
        Ok(map_typed!(DynamicMatrix => DynamicVector, self, m => m.extract_row(row, cols)))
    }

    pub fn extract_column(&self, col: usize, rows: &RangeSpec) -> Result<DynamicVector> {
        Ok(map_typed!(DynamicMatrix => DynamicVector, self, m => m.extract_column(col, rows)))
    }

    pub fn cast(&self, to: ScalarType) -> Result<Self> {
        with_typed!(DynamicMatrix, self, m => {
            Ok(build_typed!(DynamicMatrix, to, T => m.cast::<T>()))
        })
    }

    pub fn reduce_bool(&self) -> Result<bool> {
        with_typed!(DynamicMatrix, self, m => Ok(m.cast::<bool>()?.reduce_monoid(Monoid::LOr)))
    }

    pub fn reduce_int(&self) -> Result<i64> {
        with_typed!(DynamicMatrix, self, m => Ok(m.cast::<i64>()?.reduce_monoid(Monoid::Plus)))
    }

    pub fn reduce_float(&self) -> Result<f64> {
        with_typed!(DynamicMatrix, self, m => Ok(m.cast::<f64>()?.reduce_monoid(Monoid::Plus)))
    }
}

impl SparseShape for DynamicMatrix {
    fn shape(&self) -> Shape {
        Shape::Matrix(self.nrows(), self.ncols())
    }

    fn nvals(&self) -> usize {
        DynamicMatrix::nvals(self)
    }

    fn scalar_type(&self) -> ScalarType {
        DynamicMatrix::scalar_type(self)
    }
}

macro_rules! impl_from_typed {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vector<$t>> for DynamicVector {
                fn from(v: Vector<$t>) -> Self {
                    DynamicVector::$variant(v)
                }
            }

            impl From<Matrix<$t>> for DynamicMatrix {
                fn from(m: Matrix<$t>) -> Self {
                    DynamicMatrix::$variant(m)
                }
            }
        )*
    };
}

impl_from_typed! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Fp32,
    f64 => Fp64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_every_type() {
        for ty in ScalarType::ALL {
            let v = DynamicVector::from_type(ty, 7).unwrap();
            assert_eq!(v.scalar_type(), ty);
            assert_eq!(v.size(), 7);
            assert_eq!(v.nvals(), 0);
            assert_eq!(v.get(3).unwrap(), Scalar::zero(ty));

            let m = DynamicMatrix::from_type(ty, 2, 5).unwrap();
            assert_eq!(m.shape(), Shape::Matrix(2, 5));
            assert_eq!(m.scalar_type(), ty);
        }
    }

    #[test]
    fn test_coordinates_require_one_type() {
        let v = DynamicVector::from_coordinates(
            &[0, 4],
            &[Scalar::Int32(3), Scalar::Int32(-1)],
            None,
        )
        .unwrap();
        assert_eq!(v.scalar_type(), ScalarType::Int32);
        assert_eq!(v.size(), 5);

        let mixed = DynamicVector::from_coordinates(
            &[0, 1],
            &[Scalar::Int32(3), Scalar::Fp64(1.0)],
            None,
        );
        assert_eq!(
            mixed,
            Err(Error::TypeMismatch {
                lhs: ScalarType::Int32,
                rhs: ScalarType::Fp64
            })
        );
        assert!(matches!(
            DynamicVector::from_list(&[]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_set_typecasts() {
        let mut v = DynamicVector::from_type(ScalarType::Int64, 3).unwrap();
        v.set(1, Scalar::Fp64(2.0)).unwrap();
        v.set(2, Scalar::Bool(true)).unwrap();
        assert_eq!(v.get(1).unwrap(), Scalar::Int64(2));
        assert_eq!(v.try_get(2).unwrap(), Some(Scalar::Int64(1)));
        assert_eq!(v.try_get(0).unwrap(), None);
        assert!(v.set(3, Scalar::Int64(0)).is_err());
    }

    #[test]
    fn test_operands_must_share_type() {
        let a = DynamicVector::from_list(&[Scalar::Fp32(1.0), Scalar::Fp32(2.0)]).unwrap();
        let b = DynamicVector::from_list(&[Scalar::Fp32(0.5), Scalar::Fp32(0.5)]).unwrap();
        let c = a.ewise_add(&b).unwrap();
        assert_eq!(c.to_coordinate_lists().unwrap().1, vec![Scalar::Fp32(1.5), Scalar::Fp32(2.5)]);

        let d = DynamicVector::from_list(&[Scalar::Fp64(1.0), Scalar::Fp64(2.0)]).unwrap();
        assert_eq!(
            a.ewise_mult(&d),
            Err(Error::TypeMismatch {
                lhs: ScalarType::Fp32,
                rhs: ScalarType::Fp64
            })
        );
    }

    #[test]
    fn test_bool_vxm_uses_logical_semiring() {
        let frontier = DynamicVector::from_coordinates(&[0], &[Scalar::Bool(true)], Some(3)).unwrap();
        let edges = DynamicMatrix::from_edge_list(
            &[0, 1],
            &[1, 2],
            &[Scalar::Bool(true), Scalar::Bool(true)],
            Some(3),
            Some(3),
        )
        .unwrap();
        let next = frontier.vxm(&edges).unwrap();
        assert_eq!(next.to_coordinate_lists().unwrap(), (vec![1], vec![Scalar::Bool(true)]));

        let ints = DynamicMatrix::from_type(ScalarType::Int32, 3, 3).unwrap();
        assert!(matches!(frontier.vxm(&ints), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_typecasting_reductions() {
        let v = DynamicVector::from_list(&[Scalar::Fp64(1.5), Scalar::Fp64(2.5), Scalar::Fp64(0.0)])
            .unwrap();
        assert_eq!(v.reduce_float().unwrap(), 4.0);
        assert_eq!(v.reduce_int().unwrap(), 3);
        assert!(v.reduce_bool().unwrap());

        let empty = DynamicVector::from_type(ScalarType::UInt32, 4).unwrap();
        assert!(!empty.reduce_bool().unwrap());
        assert_eq!(empty.reduce_int().unwrap(), 0);

        let m = DynamicMatrix::from_edge_list(
            &[0, 1],
            &[0, 0],
            &[Scalar::UInt64(3), Scalar::UInt64(4)],
            None,
            None,
        )
        .unwrap();
        assert_eq!(m.reduce_int().unwrap(), 7);
        assert_eq!(m.reduce_float().unwrap(), 7.0);
    }

    #[test]
    fn test_matrix_ops() {
        let a = DynamicMatrix::from(
            Matrix::from_edge_list(&[0, 1], &[0, 1], &[2i64, 3], Some(2), Some(2)).unwrap(),
        );
        let b = a.mxm(&a).unwrap();
        assert_eq!(b.get(1, 1).unwrap(), Scalar::Int64(9));

        let u = DynamicVector::from(Vector::from_list(&[1i64, 1]).unwrap());
        let w = a.mxv(&u).unwrap();
        assert_eq!(w.to_coordinate_lists().unwrap().1, vec![Scalar::Int64(2), Scalar::Int64(3)]);

        let row = a.extract_row(1, &RangeSpec::All).unwrap();
        assert_eq!(row.to_coordinate_lists().unwrap(), (vec![1], vec![Scalar::Int64(3)]));

        let f = a.cast(ScalarType::Fp32).unwrap();
        assert_eq!(f.get(0, 0).unwrap(), Scalar::Fp32(2.0));
        assert_eq!(f.apply(UnaryOp::AInv).unwrap().get(0, 0).unwrap(), Scalar::Fp32(-2.0));
    }
}
