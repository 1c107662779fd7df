// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape and element-kind discovery for [`NestedArray`] values.
//!
//! The candidate shape is read off the first-child path. Every node is then
//! visited to confirm that siblings at each depth have that same length and
//! that all leaves share one kind, so jagged or mixed input is always
//! rejected rather than partially accepted.

use crate::{ElementKind, NestedArray, Shape, TensorError};

/// Returns the shape of a regular array.
///
/// Kind is not required: `[[], []]` has shape `[2, 0]`.
pub fn shape_of(array: &NestedArray) -> Result<Shape, TensorError> {
    inspect(array).map(|(shape, _)| shape)
}

/// Returns the shape and, if any leaf exists, the element kind.
///
/// Fails with [`TensorError::Structural`] on jagged input or mixed leaf kinds.
pub fn inspect(array: &NestedArray) -> Result<(Shape, Option<ElementKind>), TensorError> {
    let dims = first_path_dims(array);
    let mut kind = None;
    let mut path = Vec::with_capacity(dims.len());
    verify(array, &dims, &mut path, &mut kind)?;
    Ok((Shape::new(dims), kind))
}

/// Returns the shape and element kind of a regular, non-empty array.
///
/// Fails with [`TensorError::EmptyArray`] when no leaf exists to infer the
/// kind from.
///
/// # Examples
/// ```
/// use tensor_core::{introspect, ElementKind, NestedArray, Shape};
/// let a = NestedArray::from(vec![vec![true, false]]);
/// assert_eq!(introspect::introspect(&a).unwrap(), (Shape::matrix(1, 2), ElementKind::Bool));
///
/// let jagged = NestedArray::from(vec![vec![1i32, 2], vec![3]]);
/// assert!(introspect::introspect(&jagged).is_err());
/// ```
pub fn introspect(array: &NestedArray) -> Result<(Shape, ElementKind), TensorError> {
    let (shape, kind) = inspect(array)?;
    let kind = kind.ok_or_else(|| TensorError::EmptyArray {
        detail: format!("cannot infer the element kind of an array of shape {shape}"),
    })?;
    Ok((shape, kind))
}

/// Returns the element kind of the first leaf, without checking regularity.
pub fn infer_kind(array: &NestedArray) -> Option<ElementKind> {
    array.first_element().map(|s| s.kind())
}

fn first_path_dims(array: &NestedArray) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut node = array;
    while let NestedArray::Seq(items) = node {
        dims.push(items.len());
        match items.first() {
            Some(first) => node = first,
            None => break,
        }
    }
    dims
}

fn verify(
    node: &NestedArray,
    dims: &[usize],
    path: &mut Vec<usize>,
    kind: &mut Option<ElementKind>,
) -> Result<(), TensorError> {
    let depth = path.len();
    match node {
        NestedArray::Scalar(value) => {
            if depth != dims.len() {
                return Err(TensorError::structural(format!(
                    "scalar at {} where a sequence of length {} was expected",
                    format_path(path),
                    dims[depth]
                )));
            }
            match kind {
                None => *kind = Some(value.kind()),
                Some(k) if *k != value.kind() => {
                    return Err(TensorError::structural(format!(
                        "element at {} has kind {}, expected {}",
                        format_path(path),
                        value.kind(),
                        k
                    )));
                }
                Some(_) => {}
            }
            Ok(())
        }
        NestedArray::Seq(items) => {
            let Some(&expected) = dims.get(depth) else {
                return Err(TensorError::structural(format!(
                    "sequence at {} where a scalar was expected",
                    format_path(path)
                )));
            };
            if items.len() != expected {
                return Err(TensorError::structural(format!(
                    "sequence at {} has length {}, expected {}",
                    format_path(path),
                    items.len(),
                    expected
                )));
            }
            for (i, item) in items.iter().enumerate() {
                path.push(i);
                verify(item, dims, path, kind)?;
                path.pop();
            }
            Ok(())
        }
    }
}

fn format_path(path: &[usize]) -> String {
    format!("{path:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let (shape, kind) = introspect(&NestedArray::scalar(3.5f64)).unwrap();
        assert!(shape.is_scalar());
        assert_eq!(kind, ElementKind::Float64);
    }

    #[test]
    fn test_rank_three() {
        let a = NestedArray::from([[[1i8; 4]; 3]; 2]);
        assert_eq!(introspect(&a).unwrap(), (Shape::new(vec![2, 3, 4]), ElementKind::Int8));
    }

    #[test]
    fn test_jagged_reports_path() {
        let a = NestedArray::from(vec![vec![vec![1i32, 2], vec![3, 4]], vec![vec![5, 6], vec![7]]]);
        match introspect(&a) {
            Err(TensorError::Structural { detail }) => {
                assert!(detail.contains("[1, 1]"), "{detail}");
                assert!(detail.contains("length 1"), "{detail}");
            }
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_jagged_beyond_first_path() {
        // The first path looks regular; the defect is in the last sibling.
        let a = NestedArray::Seq(vec![
            NestedArray::from(vec![1i32, 2]),
            NestedArray::from(vec![3i32, 4]),
            NestedArray::scalar(5i32),
        ]);
        assert!(matches!(introspect(&a), Err(TensorError::Structural { .. })));
    }

    #[test]
    fn test_depth_mismatch() {
        let a = NestedArray::Seq(vec![
            NestedArray::scalar(1i32),
            NestedArray::from(vec![2i32]),
        ]);
        assert!(matches!(introspect(&a), Err(TensorError::Structural { .. })));
    }

    #[test]
    fn test_mixed_kinds() {
        let a = NestedArray::Seq(vec![NestedArray::scalar(1i32), NestedArray::scalar(1i64)]);
        match introspect(&a) {
            Err(TensorError::Structural { detail }) => assert!(detail.contains("int64")),
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty() {
        let a = NestedArray::Seq(vec![NestedArray::empty(), NestedArray::empty()]);
        assert_eq!(shape_of(&a).unwrap(), Shape::new(vec![2, 0]));
        assert!(matches!(introspect(&a), Err(TensorError::EmptyArray { .. })));
        assert_eq!(inspect(&NestedArray::empty()).unwrap(), (Shape::vector(0), None));
    }

    #[test]
    fn test_empty_sibling_against_nonempty() {
        let a = NestedArray::Seq(vec![NestedArray::empty(), NestedArray::from(vec![1i32])]);
        assert!(matches!(introspect(&a), Err(TensorError::Structural { .. })));
    }

    #[test]
    fn test_infer_kind() {
        assert_eq!(infer_kind(&NestedArray::from(vec!["a", "b"])), Some(ElementKind::Text));
        assert_eq!(infer_kind(&NestedArray::empty()), None);
    }
}
