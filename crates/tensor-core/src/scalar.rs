// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Single values tagged with their [`ElementKind`].

use crate::{coerce, BufferData, ElementKind, TensorError};
use std::fmt;

/// A single value of one [`ElementKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
}

impl Scalar {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::Bool(_) => ElementKind::Bool,
            Scalar::Int8(_) => ElementKind::Int8,
            Scalar::UInt8(_) => ElementKind::UInt8,
            Scalar::Int32(_) => ElementKind::Int32,
            Scalar::Int64(_) => ElementKind::Int64,
            Scalar::Float32(_) => ElementKind::Float32,
            Scalar::Float64(_) => ElementKind::Float64,
            Scalar::Text(_) => ElementKind::Text,
        }
    }

    /// Converts this value to `to` following the coercion rules in
    /// [`crate::coerce`].
    pub fn coerce(&self, to: ElementKind) -> Result<Scalar, TensorError> {
        coerce::coerce(self, to)
    }

    /// Converts this value into the native Rust type `T`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Scalar;
    /// assert_eq!(Scalar::Float64(1.9).to::<i32>().unwrap(), 1);
    /// assert_eq!(Scalar::UInt8(200).to::<i32>().unwrap(), 200);
    /// ```
    pub fn to<T: Element>(&self) -> Result<T, TensorError> {
        coerce::extract(self)
    }
}

/// Renders the canonical text form (the same one used for `→ Text` coercion).
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            other => f.write_str(&coerce::render(other)),
        }
    }
}

/// A native Rust type that corresponds to exactly one [`ElementKind`].
///
/// Implemented for `bool`, `i8`, `u8`, `i32`, `i64`, `f32`, `f64` and `String`.
pub trait Element: Clone + Sized + Send + Sync + 'static {
    /// The element kind this type maps to.
    const KIND: ElementKind;

    /// Wraps the value in a [`Scalar`].
    fn into_scalar(self) -> Scalar;

    /// Unwraps a [`Scalar`] of kind [`Element::KIND`]; `None` for any other kind.
    fn from_scalar(value: Scalar) -> Option<Self>;

    /// Packs a vector of values into buffer storage.
    fn into_data(values: Vec<Self>) -> BufferData;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn from_scalar(value: Scalar) -> Option<Self> {
                match value {
                    Scalar::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> BufferData {
                BufferData::$variant(values)
            }
        }

        impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self {
                Scalar::$variant(value)
            }
        }
    };
}

impl_element!(bool, Bool);
impl_element!(i8, Int8);
impl_element!(u8, UInt8);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl Element for String {
    const KIND: ElementKind = ElementKind::Text;

    fn into_scalar(self) -> Scalar {
        Scalar::Text(self)
    }

    fn from_scalar(value: Scalar) -> Option<Self> {
        match value {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    fn into_data(values: Vec<Self>) -> BufferData {
        BufferData::Text(values.into_iter().map(String::into_bytes).collect())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}
