// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Declared tensors: the name, kind and (partially known) shape of one
//! signature input or output.

use std::fmt;
use tensor_core::{ElementKind, Shape};

/// A declared shape in which any extent may be unknown.
///
/// Serialised as a JSON array where `null` marks an unknown extent, e.g.
/// `[null, 784]` for a batch of 784-element rows.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DeclaredShape(Vec<Option<usize>>);

impl DeclaredShape {
    pub fn new(dims: Vec<Option<usize>>) -> Self {
        Self(dims)
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Returns `true` if every extent is known.
    pub fn is_fully_known(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Returns `true` if `shape` has the declared rank and agrees with every
    /// known extent.
    ///
    /// # Examples
    /// ```
    /// use signature_ir::DeclaredShape;
    /// use tensor_core::Shape;
    /// let declared = DeclaredShape::new(vec![None, Some(3)]);
    /// assert!(declared.accepts(&Shape::matrix(8, 3)));
    /// assert!(!declared.accepts(&Shape::matrix(8, 4)));
    /// assert!(!declared.accepts(&Shape::vector(3)));
    /// ```
    pub fn accepts(&self, shape: &Shape) -> bool {
        shape.rank() == self.rank()
            && self
                .0
                .iter()
                .zip(shape.dims())
                .all(|(declared, &actual)| declared.map_or(true, |d| d == actual))
    }
}

impl From<&Shape> for DeclaredShape {
    fn from(shape: &Shape) -> Self {
        Self(shape.dims().iter().copied().map(Some).collect())
    }
}

impl From<Vec<Option<usize>>> for DeclaredShape {
    fn from(dims: Vec<Option<usize>>) -> Self {
        Self(dims)
    }
}

impl fmt::Display for DeclaredShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match d {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "?")?,
            }
        }
        write!(f, "]")
    }
}

/// One named input or output of a signature.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorSpec {
    /// Name the caller binds or requests (e.g., `"x"`, `"logits"`).
    pub name: String,
    /// Element kind the backend expects or produces.
    pub kind: ElementKind,
    /// Declared shape; `None` when the backend declares nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<DeclaredShape>,
}

impl TensorSpec {
    /// Creates a spec with no shape declaration.
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: None,
        }
    }

    /// Attaches a shape declaration.
    pub fn with_shape(mut self, shape: impl Into<DeclaredShape>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Returns `true` if `shape` satisfies the declaration, or if none exists.
    pub fn accepts_shape(&self, shape: &Shape) -> bool {
        self.shape.as_ref().map_or(true, |d| d.accepts(shape))
    }

    /// Returns a one-line description, e.g. `"x: float32 [?, 784]"`.
    pub fn summary(&self) -> String {
        match &self.shape {
            Some(shape) => format!("{}: {} {}", self.name, self.kind, shape),
            None => format!("{}: {}", self.name, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_shape_display() {
        let d = DeclaredShape::new(vec![None, Some(784)]);
        assert_eq!(d.to_string(), "[?, 784]");
        assert!(!d.is_fully_known());
        assert_eq!(DeclaredShape::from(&Shape::scalar()).to_string(), "[]");
    }

    #[test]
    fn test_accepts_scalar() {
        let d = DeclaredShape::from(&Shape::scalar());
        assert!(d.accepts(&Shape::scalar()));
        assert!(!d.accepts(&Shape::vector(1)));
    }

    #[test]
    fn test_spec_without_shape_accepts_anything() {
        let s = TensorSpec::new("a", ElementKind::Text);
        assert!(s.accepts_shape(&Shape::scalar()));
        assert!(s.accepts_shape(&Shape::new(vec![2, 3, 4])));
        assert_eq!(s.summary(), "a: text");
    }

    #[test]
    fn test_serde_null_extent() {
        let s: TensorSpec =
            serde_json::from_str(r#"{ "name": "x", "kind": "float32", "shape": [null, 2] }"#).unwrap();
        assert_eq!(s.shape, Some(DeclaredShape::new(vec![None, Some(2)])));
        assert_eq!(s.summary(), "x: float32 [?, 2]");

        let json = serde_json::to_string(&TensorSpec::new("y", ElementKind::Int64)).unwrap();
        assert!(!json.contains("shape"));
    }
}
