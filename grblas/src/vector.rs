//! Sparse vector storage
//!
//! A `Vector<T>` holds its stored entries as two parallel arrays, indices
//! strictly ascending. Absent indices read as the element type's zero;
//! a stored zero is still a stored entry.

use core::iter::{Copied, Zip};
use core::slice;

use grblas_core::{
    check_index, validate_dimension, Element, Error, Result, ScalarType, Shape, SparseShape,
};
use log::{debug, trace};

use crate::config::ExecConfig;
use crate::storage::{sort_dedup_last, try_to_vec, try_with_capacity};

/// Sparse vector with a fixed element type
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(
        try_from = "VectorParts<T>",
        into = "VectorParts<T>",
        bound(
            serialize = "T: serde::Serialize",
            deserialize = "T: serde::Deserialize<'de>"
        )
    )
)]
pub struct Vector<T: Element> {
    size: usize,
    indices: Vec<usize>,
    values: Vec<T>,
}

/// Iterator over `(index, value)` in ascending index order
pub type Iter<'a, T> = Zip<Copied<slice::Iter<'a, usize>>, Copied<slice::Iter<'a, T>>>;

impl<T: Element> Vector<T> {
    /// Empty vector of the given size
    pub fn new(size: usize) -> Result<Self> {
        let size = validate_dimension("size", size)?;
        Ok(Self {
            size,
            indices: Vec::new(),
            values: Vec::new(),
        })
    }

    /// Build from parallel index/value lists
    ///
    /// Without an explicit size the vector is sized to the largest index
    /// plus one. Repeated indices keep the value that came last.
    pub fn from_coordinates(indices: &[usize], values: &[T], size: Option<usize>) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(Error::InvalidArgument {
                arg: "values",
                reason: "indices and values differ in length",
            });
        }
        if indices.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "indices",
                reason: "coordinate list is empty",
            });
        }

        let max_index = indices.iter().copied().max().unwrap_or(0);
        let size = match size {
            Some(size) => validate_dimension("size", size)?,
            None => validate_dimension("size", max_index.saturating_add(1))?,
        };
        check_index(max_index, size)?;

        let mut entries = try_with_capacity(indices.len())?;
        entries.extend(indices.iter().copied().zip(values.iter().copied()));
        let parallel = ExecConfig::global().should_parallelize(entries.len());
        let dropped = sort_dedup_last(&mut entries, parallel);
        if dropped > 0 {
            debug!("vector build collapsed {dropped} repeated indices");
        }

        let (indices, values) = split_pairs(&entries)?;
        Ok(Self {
            size,
            indices,
            values,
        })
    }

    /// Dense constructor: every list position becomes a stored entry
    ///
    /// An empty list is rejected; use `new` for an empty vector.
    pub fn from_list(values: &[T]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidArgument {
                arg: "values",
                reason: "dense list must not be empty",
            });
        }
        let size = validate_dimension("size", values.len())?;
        let mut indices = try_with_capacity(size)?;
        indices.extend(0..size);
        Ok(Self {
            size,
            indices,
            values: try_to_vec(values)?,
        })
    }

    /// Assemble from storage already in canonical form
    pub(crate) fn from_sorted_parts(size: usize, indices: Vec<usize>, values: Vec<T>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(indices.last().map_or(true, |&i| i < size));
        Self {
            size,
            indices,
            values,
        }
    }

    /// Assemble from untrusted storage, checking every invariant
    pub fn try_from_parts(size: usize, indices: Vec<usize>, values: Vec<T>) -> Result<Self> {
        let size = validate_dimension("size", size)?;
        if indices.len() != values.len() {
            return Err(Error::InvalidArgument {
                arg: "values",
                reason: "indices and values differ in length",
            });
        }
        if indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidArgument {
                arg: "indices",
                reason: "indices must be strictly ascending",
            });
        }
        if let Some(&last) = indices.last() {
            check_index(last, size)?;
        }
        Ok(Self {
            size,
            indices,
            values,
        })
    }

    /// Independent deep copy
    pub fn dup(&self) -> Result<Self> {
        Ok(Self {
            size: self.size,
            indices: try_to_vec(&self.indices)?,
            values: try_to_vec(&self.values)?,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored entries
    pub fn nvals(&self) -> usize {
        self.indices.len()
    }

    pub fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }

    /// Stored indices, ascending
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Stored values, aligned with `indices`
    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn position(&self, index: usize) -> core::result::Result<usize, usize> {
        self.indices.binary_search(&index)
    }

    /// Stored value at `index`, `None` if absent
    pub fn try_get(&self, index: usize) -> Result<Option<T>> {
        check_index(index, self.size)?;
        Ok(self.position(index).ok().map(|p| self.values[p]))
    }

    /// Value at `index`; absent entries read as zero
    pub fn get(&self, index: usize) -> Result<T> {
        Ok(self.try_get(index)?.unwrap_or_else(T::zero))
    }

    /// Whether `index` holds a stored entry
    pub fn contains(&self, index: usize) -> bool {
        self.position(index).is_ok()
    }

    /// Insert or overwrite a single entry
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        check_index(index, self.size)?;
        match self.position(index) {
            Ok(p) => self.values[p] = value,
            Err(p) => {
                self.indices
                    .try_reserve(1)
                    .map_err(|_| Error::out_of_memory())?;
                self.values
                    .try_reserve(1)
                    .map_err(|_| Error::out_of_memory())?;
                self.indices.insert(p, index);
                self.values.insert(p, value);
            }
        }
        Ok(())
    }

    /// Delete a stored entry, returning its value
    pub fn remove(&mut self, index: usize) -> Result<Option<T>> {
        check_index(index, self.size)?;
        Ok(match self.position(index) {
            Ok(p) => {
                self.indices.remove(p);
                Some(self.values.remove(p))
            }
            Err(_) => None,
        })
    }

    /// Remove every stored entry, keeping size and type
    pub fn clear(&mut self) {
        self.indices.clear();
        self.values.clear();
    }

    /// Change the size; entries at or beyond the new size are dropped
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        let new_size = validate_dimension("size", new_size)?;
        let keep = self.indices.partition_point(|&i| i < new_size);
        let dropped = self.indices.len() - keep;
        if dropped > 0 {
            debug!(
                "resize {} -> {} dropped {} entries",
                self.size, new_size, dropped
            );
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
        self.size = new_size;
        Ok(())
    }

    /// Same size and same stored entries
    pub fn is_equal(&self, other: &Self) -> bool {
        self == other
    }

    /// Stored entries as `(indices, values)`, ascending by index
    pub fn to_coordinate_lists(&self) -> Result<(Vec<usize>, Vec<T>)> {
        Ok((try_to_vec(&self.indices)?, try_to_vec(&self.values)?))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.indices
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Typecast every stored value into another element type
    pub fn cast<U: Element>(&self) -> Result<Vector<U>> {
        let mut values = try_with_capacity(self.values.len())?;
        values.extend(self.values.iter().map(|v| U::cast_from(v.to_scalar())));
        trace!(
            "cast vector {} -> {} nvals={}",
            T::SCALAR_TYPE,
            U::SCALAR_TYPE,
            values.len()
        );
        Ok(Vector::from_sorted_parts(
            self.size,
            try_to_vec(&self.indices)?,
            values,
        ))
    }

    #[cfg(feature = "serde")]
    pub(crate) fn into_parts(self) -> (usize, Vec<usize>, Vec<T>) {
        (self.size, self.indices, self.values)
    }
}

/// Split sorted unique `(index, value)` pairs into parallel arrays
pub(crate) fn split_pairs<T: Copy>(entries: &[(usize, T)]) -> Result<(Vec<usize>, Vec<T>)> {
    let mut indices = try_with_capacity(entries.len())?;
    let mut values = try_with_capacity(entries.len())?;
    for &(i, v) in entries {
        indices.push(i);
        values.push(v);
    }
    Ok((indices, values))
}

impl<T: Element> SparseShape for Vector<T> {
    fn shape(&self) -> Shape {
        Shape::Vector(self.size)
    }

    fn nvals(&self) -> usize {
        self.indices.len()
    }

    fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }
}

impl<'a, T: Element> IntoIterator for &'a Vector<T> {
    type Item = (usize, T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serialized form of a vector
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct VectorParts<T> {
    pub size: usize,
    pub indices: Vec<usize>,
    pub values: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T: Element> TryFrom<VectorParts<T>> for Vector<T> {
    type Error = Error;

    fn try_from(parts: VectorParts<T>) -> Result<Self> {
        Vector::try_from_parts(parts.size, parts.indices, parts.values)
    }
}

#[cfg(feature = "serde")]
impl<T: Element> From<Vector<T>> for VectorParts<T> {
    fn from(v: Vector<T>) -> Self {
        let (size, indices, values) = v.into_parts();
        VectorParts {
            size,
            indices,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_coordinates_scenario() {
        let v = Vector::from_coordinates(&[0, 2, 4], &[10i64, 20, 30], Some(5)).unwrap();
        assert_eq!(v.nvals(), 3);
        assert_eq!(v.size(), 5);
        assert_eq!(v.get(1).unwrap(), 0);
        assert_eq!(v.get(2).unwrap(), 20);
        assert_eq!(v.try_get(1).unwrap(), None);
    }

    #[test]
    fn test_from_coordinates_infers_size() {
        let v = Vector::from_coordinates(&[7, 1], &[1.0f64, 2.0], None).unwrap();
        assert_eq!(v.size(), 8);
        assert_eq!(v.indices(), &[1, 7]);
        assert_eq!(v.values(), &[2.0, 1.0]);
    }

    #[test]
    fn test_from_coordinates_rejects_bad_input() {
        assert!(matches!(
            Vector::from_coordinates(&[0, 1], &[1i32], None),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            Vector::<i32>::from_coordinates(&[], &[], Some(3)),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(
            Vector::from_coordinates(&[3], &[1i32], Some(3)),
            Err(Error::OutOfBounds { index: 3, size: 3 })
        );
    }

    #[test]
    fn test_repeated_index_last_wins() {
        let v = Vector::from_coordinates(&[2, 2, 0], &[5u32, 6, 1], None).unwrap();
        assert_eq!(v.nvals(), 2);
        assert_eq!(v.get(2).unwrap(), 6);
    }

    #[test]
    fn test_set_get_bounds() {
        let mut v = Vector::<bool>::new(4).unwrap();
        v.set(3, true).unwrap();
        v.set(1, false).unwrap();
        assert_eq!(v.nvals(), 2);
        assert_eq!(v.indices(), &[1, 3]);
        assert_eq!(v.set(4, true), Err(Error::OutOfBounds { index: 4, size: 4 }));
        assert_eq!(v.get(4), Err(Error::OutOfBounds { index: 4, size: 4 }));
        // a stored false is still a stored entry
        assert_eq!(v.try_get(1).unwrap(), Some(false));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut v = Vector::from_list(&[1i64, 2, 3, 4]).unwrap();
        v.resize(2).unwrap();
        assert_eq!(v.size(), 2);
        assert_eq!(v.to_coordinate_lists().unwrap(), (vec![0, 1], vec![1, 2]));
        v.resize(10).unwrap();
        assert_eq!(v.nvals(), 2);
        v.clear();
        assert_eq!(v.nvals(), 0);
        assert_eq!(v.size(), 10);
        assert_eq!(v.scalar_type(), ScalarType::Int64);
    }

    #[test]
    fn test_from_list_rejects_empty() {
        assert!(matches!(
            Vector::<f64>::from_list(&[]),
            Err(Error::InvalidArgument { arg: "values", .. })
        ));
        let v = Vector::from_list(&[7u32]).unwrap();
        assert_eq!((v.size(), v.nvals()), (1, 1));
    }

    #[test]
    fn test_remove() {
        let mut v = Vector::from_list(&[1i64, 2]).unwrap();
        assert_eq!(v.remove(0).unwrap(), Some(1));
        assert_eq!(v.remove(0).unwrap(), None);
        assert_eq!(v.nvals(), 1);
    }

    #[test]
    fn test_iteration_is_ascending() {
        let v = Vector::from_coordinates(&[9, 3, 5], &[1i32, 2, 3], None).unwrap();
        let seen: Vec<(usize, i32)> = (&v).into_iter().collect();
        assert_eq!(seen, vec![(3, 2), (5, 3), (9, 1)]);
    }

    #[test]
    fn test_try_from_parts_validates() {
        assert!(Vector::try_from_parts(3, vec![2, 1], vec![1i32, 2]).is_err());
        assert!(Vector::try_from_parts(3, vec![1, 3], vec![1i32, 2]).is_err());
        assert!(Vector::try_from_parts(3, vec![0, 2], vec![1i32, 2]).is_ok());
    }

    #[test]
    fn test_cast() {
        let v = Vector::from_list(&[1.5f64, 0.0, -2.7]).unwrap();
        let c: Vector<i64> = v.cast().unwrap();
        assert_eq!(c.values(), &[1, 0, -2]);
        let b: Vector<bool> = v.cast().unwrap();
        assert_eq!(b.values(), &[true, false, true]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let v = Vector::from_coordinates(&[1, 4], &[2i64, 3], Some(6)).unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: Vector<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);

        let bad = r#"{"size":2,"indices":[5],"values":[1]}"#;
        assert!(serde_json::from_str::<Vector<i64>>(bad).is_err());
    }

    fn arb_vector() -> impl Strategy<Value = Vector<i64>> {
        (1usize..64).prop_flat_map(|size| {
            proptest::collection::btree_map(0..size, -100i64..100, 1..=size).prop_map(
                move |entries| {
                    let (idx, val): (Vec<usize>, Vec<i64>) = entries.into_iter().unzip();
                    Vector::from_coordinates(&idx, &val, Some(size)).unwrap()
                },
            )
        })
    }

    proptest! {
        #[test]
        fn prop_dup_is_independent(v in arb_vector(), value in -5i64..5) {
            let mut copy = v.dup().unwrap();
            prop_assert!(copy.is_equal(&v));
            let before = v.clone();
            copy.set(0, value.wrapping_add(1000)).unwrap();
            prop_assert_eq!(&v, &before);
        }

        #[test]
        fn prop_coordinate_roundtrip(v in arb_vector()) {
            let (idx, val) = v.to_coordinate_lists().unwrap();
            let back = Vector::from_coordinates(&idx, &val, Some(v.size())).unwrap();
            prop_assert!(back.is_equal(&v));
        }
    }
}
