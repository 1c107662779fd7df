// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Recursive, in-memory array values.

use crate::{introspect, Scalar, TensorError};

/// A possibly multi-dimensional array value: a scalar leaf or an ordered
/// sequence of sub-arrays.
///
/// A well-formed value is regular (siblings at the same depth have equal
/// length) and holds leaves of a single kind. Neither property is enforced
/// on construction; [`crate::introspect::introspect`] checks both.
///
/// # Examples
/// ```
/// use tensor_core::{NestedArray, Shape};
/// let a = NestedArray::from(vec![vec![1i32, 2, 3], vec![4, 5, 6]]);
/// assert_eq!(a.depth(), 2);
/// assert_eq!(tensor_core::introspect::shape_of(&a).unwrap(), Shape::matrix(2, 3));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum NestedArray {
    Scalar(Scalar),
    Seq(Vec<NestedArray>),
}

impl NestedArray {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        NestedArray::Scalar(value.into())
    }

    /// Builds a sequence from anything convertible into sub-arrays.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NestedArray>,
    {
        NestedArray::Seq(items.into_iter().map(Into::into).collect())
    }

    /// An empty rank-1 array.
    pub fn empty() -> Self {
        NestedArray::Seq(Vec::new())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, NestedArray::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            NestedArray::Scalar(s) => Some(s),
            NestedArray::Seq(_) => None,
        }
    }

    /// Direct children; empty for a scalar.
    pub fn children(&self) -> &[NestedArray] {
        match self {
            NestedArray::Scalar(_) => &[],
            NestedArray::Seq(items) => items,
        }
    }

    /// Nesting depth along the first-child path. Equals the rank for a
    /// regular array.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut node = self;
        while let NestedArray::Seq(items) = node {
            depth += 1;
            match items.first() {
                Some(first) => node = first,
                None => break,
            }
        }
        depth
    }

    /// Follows index 0 at every level down to a scalar.
    ///
    /// Returns `None` if an empty sequence is reached first.
    pub fn first_element(&self) -> Option<&Scalar> {
        let mut node = self;
        loop {
            match node {
                NestedArray::Scalar(s) => return Some(s),
                NestedArray::Seq(items) => node = items.first()?,
            }
        }
    }

    /// For each entry along the leading dimension, its first scalar.
    ///
    /// A scalar yields itself. Fails with [`TensorError::EmptyArray`] if any
    /// entry contains no scalar.
    pub fn first_dimension_values(&self) -> Result<Vec<Scalar>, TensorError> {
        match self {
            NestedArray::Scalar(s) => Ok(vec![s.clone()]),
            NestedArray::Seq(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.first_element().cloned().ok_or_else(|| TensorError::EmptyArray {
                        detail: format!("entry {i} of the leading dimension has no elements"),
                    })
                })
                .collect(),
        }
    }

    /// Combines same-shaped, same-kind arrays along a new leading dimension.
    ///
    /// Stacking `n` arrays of shape `[a, b]` gives shape `[n, a, b]`.
    pub fn stack(parts: Vec<NestedArray>) -> Result<NestedArray, TensorError> {
        let mut expected = None;
        for (i, part) in parts.iter().enumerate() {
            let current = introspect::inspect(part)?;
            match &expected {
                None => expected = Some(current),
                Some(first) => {
                    if first.0 != current.0 {
                        return Err(TensorError::ShapeMismatch {
                            op: "stack",
                            expected: first.0.to_string(),
                            actual: current.0,
                        });
                    }
                    if let (Some(a), Some(b)) = (first.1, current.1) {
                        if a != b {
                            return Err(TensorError::structural(format!(
                                "cannot stack part {i} of kind {b} onto parts of kind {a}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(NestedArray::Seq(parts))
    }

    /// Iterates over every scalar leaf in row-major order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            pending: vec![self],
        }
    }
}

/// Row-major iterator over the scalar leaves of a [`NestedArray`].
pub struct Leaves<'a> {
    pending: Vec<&'a NestedArray>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Scalar;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.pending.pop() {
            match node {
                NestedArray::Scalar(s) => return Some(s),
                NestedArray::Seq(items) => self.pending.extend(items.iter().rev()),
            }
        }
        None
    }
}

macro_rules! leaf_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NestedArray {
                fn from(value: $ty) -> Self {
                    NestedArray::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

leaf_from!(bool, i8, u8, i32, i64, f32, f64, String, &str);

impl From<Scalar> for NestedArray {
    fn from(value: Scalar) -> Self {
        NestedArray::Scalar(value)
    }
}

impl<T: Into<NestedArray>> From<Vec<T>> for NestedArray {
    fn from(items: Vec<T>) -> Self {
        NestedArray::seq(items)
    }
}

impl<T: Into<NestedArray>, const N: usize> From<[T; N]> for NestedArray {
    fn from(items: [T; N]) -> Self {
        NestedArray::seq(items)
    }
}

/// The physical form of a text array: every text element expanded into its
/// UTF-8 byte sequence, which adds one trailing dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedBytes {
    Bytes(Vec<u8>),
    Seq(Vec<NestedBytes>),
}

impl NestedBytes {
    /// Physical rank along the first-child path; a bare byte sequence has rank 1.
    pub fn rank(&self) -> usize {
        match self {
            NestedBytes::Bytes(_) => 1,
            NestedBytes::Seq(items) => 1 + items.first().map_or(0, NestedBytes::rank),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, Shape};

    #[test]
    fn test_depth() {
        assert_eq!(NestedArray::scalar(1i32).depth(), 0);
        assert_eq!(NestedArray::from(vec![1i32, 2]).depth(), 1);
        assert_eq!(NestedArray::from([[[0.5f32; 2]; 3]; 4]).depth(), 3);
        assert_eq!(NestedArray::empty().depth(), 1);
    }

    #[test]
    fn test_leaves_row_major() {
        let a = NestedArray::from(vec![vec![1i64, 2], vec![3, 4]]);
        let leaves: Vec<_> = a.leaves().cloned().collect();
        assert_eq!(
            leaves,
            vec![Scalar::Int64(1), Scalar::Int64(2), Scalar::Int64(3), Scalar::Int64(4)]
        );
        assert_eq!(NestedArray::scalar("x").leaves().count(), 1);
        assert_eq!(NestedArray::empty().leaves().count(), 0);
    }

    #[test]
    fn test_first_element() {
        let a = NestedArray::from(vec![vec![7u8, 8], vec![9, 10]]);
        assert_eq!(a.first_element(), Some(&Scalar::UInt8(7)));
        assert_eq!(NestedArray::empty().first_element(), None);
    }

    #[test]
    fn test_first_dimension_values() {
        let a = NestedArray::from(vec![vec![1.5f64, 0.0], vec![2.5, 0.0], vec![3.5, 0.0]]);
        assert_eq!(
            a.first_dimension_values().unwrap(),
            vec![Scalar::Float64(1.5), Scalar::Float64(2.5), Scalar::Float64(3.5)]
        );

        let holey = NestedArray::Seq(vec![NestedArray::from(vec![1i32]), NestedArray::empty()]);
        assert!(matches!(
            holey.first_dimension_values(),
            Err(TensorError::EmptyArray { .. })
        ));
    }

    #[test]
    fn test_stack_2d_into_3d() {
        let a = NestedArray::from(vec![vec![1i32, 2], vec![3, 4]]);
        let b = NestedArray::from(vec![vec![5i32, 6], vec![7, 8]]);
        let stacked = NestedArray::stack(vec![a, b]).unwrap();
        let (shape, kind) = introspect::introspect(&stacked).unwrap();
        assert_eq!(shape, Shape::new(vec![2, 2, 2]));
        assert_eq!(kind, ElementKind::Int32);
        assert_eq!(stacked.children()[1].first_element(), Some(&Scalar::Int32(5)));
    }

    #[test]
    fn test_stack_rejects_mismatch() {
        let a = NestedArray::from(vec![1i32, 2]);
        let b = NestedArray::from(vec![1i32, 2, 3]);
        assert!(matches!(
            NestedArray::stack(vec![a.clone(), b]),
            Err(TensorError::ShapeMismatch { op: "stack", .. })
        ));

        let c = NestedArray::from(vec![1.0f32, 2.0]);
        assert!(matches!(
            NestedArray::stack(vec![a, c]),
            Err(TensorError::Structural { .. })
        ));
    }

    #[test]
    fn test_nested_bytes_rank() {
        let b = NestedBytes::Seq(vec![NestedBytes::Bytes(b"ab".to_vec())]);
        assert_eq!(b.rank(), 2);
        assert_eq!(NestedBytes::Bytes(vec![]).rank(), 1);
    }
}
