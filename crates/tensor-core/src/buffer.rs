// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Flat, shape-tagged buffers: the exchange format with a computation backend.

use crate::{coerce, Element, ElementKind, Scalar, Shape, TensorError};

/// Typed, contiguous element storage for one [`ElementKind`].
///
/// Text elements are stored as raw UTF-8 byte sequences, one per element.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Text(Vec<Vec<u8>>),
}

impl BufferData {
    /// Creates empty storage for `kind` with room for `capacity` elements.
    pub fn with_capacity(kind: ElementKind, capacity: usize) -> Self {
        match kind {
            ElementKind::Bool => BufferData::Bool(Vec::with_capacity(capacity)),
            ElementKind::Int8 => BufferData::Int8(Vec::with_capacity(capacity)),
            ElementKind::UInt8 => BufferData::UInt8(Vec::with_capacity(capacity)),
            ElementKind::Int32 => BufferData::Int32(Vec::with_capacity(capacity)),
            ElementKind::Int64 => BufferData::Int64(Vec::with_capacity(capacity)),
            ElementKind::Float32 => BufferData::Float32(Vec::with_capacity(capacity)),
            ElementKind::Float64 => BufferData::Float64(Vec::with_capacity(capacity)),
            ElementKind::Text => BufferData::Text(Vec::with_capacity(capacity)),
        }
    }

    /// Returns the element kind of this storage.
    pub fn kind(&self) -> ElementKind {
        match self {
            BufferData::Bool(_) => ElementKind::Bool,
            BufferData::Int8(_) => ElementKind::Int8,
            BufferData::UInt8(_) => ElementKind::UInt8,
            BufferData::Int32(_) => ElementKind::Int32,
            BufferData::Int64(_) => ElementKind::Int64,
            BufferData::Float32(_) => ElementKind::Float32,
            BufferData::Float64(_) => ElementKind::Float64,
            BufferData::Text(_) => ElementKind::Text,
        }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        match self {
            BufferData::Bool(v) => v.len(),
            BufferData::Int8(v) => v.len(),
            BufferData::UInt8(v) => v.len(),
            BufferData::Int32(v) => v.len(),
            BufferData::Int64(v) => v.len(),
            BufferData::Float32(v) => v.len(),
            BufferData::Float64(v) => v.len(),
            BufferData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a value, which must already have this storage's kind.
    ///
    /// Text values are encoded as UTF-8.
    pub fn push(&mut self, value: Scalar) -> Result<(), TensorError> {
        match (self, value) {
            (BufferData::Bool(v), Scalar::Bool(x)) => v.push(x),
            (BufferData::Int8(v), Scalar::Int8(x)) => v.push(x),
            (BufferData::UInt8(v), Scalar::UInt8(x)) => v.push(x),
            (BufferData::Int32(v), Scalar::Int32(x)) => v.push(x),
            (BufferData::Int64(v), Scalar::Int64(x)) => v.push(x),
            (BufferData::Float32(v), Scalar::Float32(x)) => v.push(x),
            (BufferData::Float64(v), Scalar::Float64(x)) => v.push(x),
            (BufferData::Text(v), Scalar::Text(x)) => v.push(x.into_bytes()),
            (data, value) => {
                return Err(TensorError::structural(format!(
                    "cannot store {} value {value} in a {} buffer",
                    value.kind(),
                    data.kind()
                )))
            }
        }
        Ok(())
    }

    /// Reads the element at `index`, decoding text as UTF-8.
    ///
    /// Returns `None` when `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<Result<Scalar, TensorError>> {
        let value = match self {
            BufferData::Bool(v) => Scalar::Bool(*v.get(index)?),
            BufferData::Int8(v) => Scalar::Int8(*v.get(index)?),
            BufferData::UInt8(v) => Scalar::UInt8(*v.get(index)?),
            BufferData::Int32(v) => Scalar::Int32(*v.get(index)?),
            BufferData::Int64(v) => Scalar::Int64(*v.get(index)?),
            BufferData::Float32(v) => Scalar::Float32(*v.get(index)?),
            BufferData::Float64(v) => Scalar::Float64(*v.get(index)?),
            BufferData::Text(v) => return Some(decode_utf8(v.get(index)?)),
        };
        Some(Ok(value))
    }
}

pub(crate) fn decode_utf8(bytes: &[u8]) -> Result<Scalar, TensorError> {
    String::from_utf8(bytes.to_vec())
        .map(Scalar::Text)
        .map_err(|e| {
            TensorError::coercion(
                ElementKind::UInt8,
                ElementKind::Text,
                String::from_utf8_lossy(bytes),
                e.to_string(),
            )
        })
}

/// Element count of `shape`, rejecting shapes whose extents overflow `usize`.
fn element_count(shape: &Shape) -> Result<usize, TensorError> {
    shape
        .checked_num_elements()
        .ok_or_else(|| TensorError::structural(format!("element count of shape {shape} overflows")))
}

/// A contiguous, shape-tagged buffer of one element kind.
///
/// Elements are stored in row-major (C) order. The invariant
/// `len() == shape().num_elements()` is checked on construction, and shapes
/// whose element count overflows are rejected.
///
/// A text buffer has one fewer dimension than its physical byte layout:
/// each element is itself a variable-length byte sequence (see
/// [`FlatBuffer::physical_rank`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBuffer {
    shape: Shape,
    data: BufferData,
}

impl FlatBuffer {
    /// Creates a buffer, checking that the element count matches the shape.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{BufferData, FlatBuffer, Shape};
    /// let b = FlatBuffer::new(Shape::vector(2), BufferData::Int32(vec![4, 6])).unwrap();
    /// assert_eq!(b.len(), 2);
    /// assert!(FlatBuffer::new(Shape::vector(3), BufferData::Int32(vec![4, 6])).is_err());
    /// ```
    pub fn new(shape: Shape, data: BufferData) -> Result<Self, TensorError> {
        let expected = element_count(&shape)?;
        if data.len() != expected {
            return Err(TensorError::structural(format!(
                "shape {shape} requires {expected} elements, buffer holds {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Creates a buffer from a vector of native values.
    pub fn from_vec<T: Element>(shape: Shape, values: Vec<T>) -> Result<Self, TensorError> {
        Self::new(shape, T::into_data(values))
    }

    /// Creates a rank-0 buffer holding one value.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        let data = match value.into() {
            Scalar::Bool(v) => BufferData::Bool(vec![v]),
            Scalar::Int8(v) => BufferData::Int8(vec![v]),
            Scalar::UInt8(v) => BufferData::UInt8(vec![v]),
            Scalar::Int32(v) => BufferData::Int32(vec![v]),
            Scalar::Int64(v) => BufferData::Int64(vec![v]),
            Scalar::Float32(v) => BufferData::Float32(vec![v]),
            Scalar::Float64(v) => BufferData::Float64(vec![v]),
            Scalar::Text(v) => BufferData::Text(vec![v.into_bytes()]),
        };
        Self {
            shape: Shape::scalar(),
            data,
        }
    }

    /// Creates a buffer of `shape` filled with the zero value of `kind`
    /// (`false`, `0`, `0.0`, or the empty string).
    pub fn zeros(shape: Shape, kind: ElementKind) -> Result<Self, TensorError> {
        let n = element_count(&shape)?;
        let data = match kind {
            ElementKind::Bool => BufferData::Bool(vec![false; n]),
            ElementKind::Int8 => BufferData::Int8(vec![0; n]),
            ElementKind::UInt8 => BufferData::UInt8(vec![0; n]),
            ElementKind::Int32 => BufferData::Int32(vec![0; n]),
            ElementKind::Int64 => BufferData::Int64(vec![0; n]),
            ElementKind::Float32 => BufferData::Float32(vec![0.0; n]),
            ElementKind::Float64 => BufferData::Float64(vec![0.0; n]),
            ElementKind::Text => BufferData::Text(vec![Vec::new(); n]),
        };
        Ok(Self { shape, data })
    }

    /// Decodes little-endian raw bytes of a fixed-width kind.
    ///
    /// `Bool` uses one byte per element; any nonzero byte is `true`.
    /// Returns an error if the byte length does not equal
    /// `shape.size_bytes(kind)`, or if `kind` is [`ElementKind::Text`].
    pub fn from_le_bytes(shape: Shape, kind: ElementKind, bytes: &[u8]) -> Result<Self, TensorError> {
        let no_layout = || TensorError::structural("text buffers have no fixed-width byte layout");
        if kind.size_bytes().is_none() {
            return Err(no_layout());
        }
        let expected = shape.size_bytes(kind).ok_or_else(|| {
            TensorError::structural(format!("byte size of shape {shape} as {kind} overflows"))
        })?;
        if bytes.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        macro_rules! decode {
            ($ty:ty, $n:expr) => {
                bytes
                    .chunks_exact($n)
                    .map(|chunk| {
                        let mut raw = [0u8; $n];
                        raw.copy_from_slice(chunk);
                        <$ty>::from_le_bytes(raw)
                    })
                    .collect()
            };
        }

        let data = match kind {
            ElementKind::Bool => BufferData::Bool(bytes.iter().map(|&b| b != 0).collect()),
            ElementKind::Int8 => BufferData::Int8(bytes.iter().map(|&b| b as i8).collect()),
            ElementKind::UInt8 => BufferData::UInt8(bytes.to_vec()),
            ElementKind::Int32 => BufferData::Int32(decode!(i32, 4)),
            ElementKind::Int64 => BufferData::Int64(decode!(i64, 8)),
            ElementKind::Float32 => BufferData::Float32(decode!(f32, 4)),
            ElementKind::Float64 => BufferData::Float64(decode!(f64, 8)),
            ElementKind::Text => return Err(no_layout()),
        };
        Ok(Self { shape, data })
    }

    /// Encodes the elements as little-endian raw bytes.
    ///
    /// Returns `None` for text buffers.
    pub fn to_le_bytes(&self) -> Option<Vec<u8>> {
        let bytes = match &self.data {
            BufferData::Bool(v) => v.iter().map(|&b| u8::from(b)).collect(),
            BufferData::Int8(v) => v.iter().map(|&b| b as u8).collect(),
            BufferData::UInt8(v) => v.clone(),
            BufferData::Int32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            BufferData::Int64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            BufferData::Float32(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            BufferData::Float64(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            BufferData::Text(_) => return None,
        };
        Some(bytes)
    }

    /// Creates a buffer from an `ndarray`, reading it in logical row-major order.
    pub fn from_ndarray<T: Element>(array: ndarray::ArrayD<T>) -> Self {
        let shape = Shape::from(array.shape());
        let values: Vec<T> = array.iter().cloned().collect();
        Self {
            shape,
            data: T::into_data(values),
        }
    }

    /// Converts the buffer into an `ndarray` of `T`, coercing elements if needed.
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, TensorError> {
        let values = self.to_vec::<T>()?;
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(self.shape.dims()), values)
            .map_err(|e| TensorError::structural(e.to_string()))
    }

    /// Returns the buffer's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the buffer's element kind.
    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    /// Returns the typed storage.
    pub fn data(&self) -> &BufferData {
        &self.data
    }

    /// Splits the buffer into its shape and storage.
    pub fn into_parts(self) -> (Shape, BufferData) {
        (self.shape, self.data)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Rank of the physical representation: one more than the logical rank
    /// for text (the byte dimension of each element), equal otherwise.
    pub fn physical_rank(&self) -> usize {
        match self.kind() {
            ElementKind::Text => self.shape.rank() + 1,
            _ => self.shape.rank(),
        }
    }

    /// Iterates over the elements in row-major order.
    pub fn scalars(&self) -> impl Iterator<Item = Result<Scalar, TensorError>> + '_ {
        (0..self.len()).filter_map(move |i| self.data.get(i))
    }

    /// Collects every element as a [`Scalar`].
    pub fn to_scalars(&self) -> Result<Vec<Scalar>, TensorError> {
        self.scalars().collect()
    }

    /// Collects every element as `T`, coercing from the buffer's kind.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, TensorError> {
        self.scalars()
            .map(|value| coerce::extract::<T>(&value?))
            .collect()
    }

    /// Index of the largest element of a rank-1 buffer, comparing values as
    /// `Float64`. Ties resolve to the first index; NaN never wins.
    pub fn arg_max(&self) -> Result<usize, TensorError> {
        if self.shape.rank() != 1 {
            return Err(TensorError::ShapeMismatch {
                op: "arg_max",
                expected: "rank 1".into(),
                actual: self.shape.clone(),
            });
        }
        let values = self.to_vec::<f64>()?;
        arg_max_of(&values).ok_or_else(|| TensorError::EmptyArray {
            detail: "arg_max of an empty buffer".into(),
        })
    }

    /// Per-row [`FlatBuffer::arg_max`] of a rank-2 buffer.
    pub fn arg_max_rows(&self) -> Result<Vec<usize>, TensorError> {
        let (rows, cols) = match self.shape.dims() {
            &[rows, cols] => (rows, cols),
            _ => {
                return Err(TensorError::ShapeMismatch {
                    op: "arg_max_rows",
                    expected: "rank 2".into(),
                    actual: self.shape.clone(),
                })
            }
        };
        if cols == 0 {
            return Err(TensorError::EmptyArray {
                detail: "arg_max_rows over rows of length 0".into(),
            });
        }
        let values = self.to_vec::<f64>()?;
        Ok(values
            .chunks_exact(cols)
            .take(rows)
            .filter_map(arg_max_of)
            .collect())
    }
}

fn arg_max_of(values: &[f64]) -> Option<usize> {
    let first = values.first()?;
    let mut best = (0, *first);
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > best.1 || (best.1.is_nan() && !v.is_nan()) {
            best = (i, v);
        }
    }
    Some(best.0)
}

macro_rules! typed_slice {
    ($name:ident, $variant:ident, $ty:ty) => {
        /// Borrows the storage as a typed slice; `None` for any other kind.
        pub fn $name(&self) -> Option<&[$ty]> {
            match &self.data {
                BufferData::$variant(v) => Some(v),
                _ => None,
            }
        }
    };
}

impl FlatBuffer {
    typed_slice!(as_bool_slice, Bool, bool);
    typed_slice!(as_i8_slice, Int8, i8);
    typed_slice!(as_u8_slice, UInt8, u8);
    typed_slice!(as_i32_slice, Int32, i32);
    typed_slice!(as_i64_slice, Int64, i64);
    typed_slice!(as_f32_slice, Float32, f32);
    typed_slice!(as_f64_slice, Float64, f64);
    typed_slice!(as_text_bytes, Text, Vec<u8>);
}
