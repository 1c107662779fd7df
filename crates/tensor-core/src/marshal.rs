// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Conversion between [`NestedArray`] values and [`FlatBuffer`]s.
//!
//! Elements are laid out row-major (last dimension fastest). Text elements
//! travel as UTF-8 byte sequences: a text buffer of logical rank `r` has a
//! physical rank of `r + 1`. [`strings_to_bytes`] and [`bytes_to_strings`]
//! cross that boundary explicitly for callers that need the byte form.

use crate::buffer::decode_utf8;
use crate::{
    coerce, introspect, BufferData, ElementKind, FlatBuffer, NestedArray, NestedBytes, Scalar,
    Shape, TensorError,
};

pub use crate::coerce::coerce_buffer;

/// Flattens `array` into a buffer of `kind`, coercing leaves whose kind differs.
///
/// An empty array is accepted: the caller-supplied kind stands in for the
/// one that cannot be inferred.
///
/// # Examples
/// ```
/// use tensor_core::{marshal, ElementKind, NestedArray, Shape};
/// let a = NestedArray::from(vec![vec![1i32, 2], vec![3, 4]]);
/// let b = marshal::to_buffer(&a, ElementKind::Float32).unwrap();
/// assert_eq!(b.shape(), &Shape::matrix(2, 2));
/// assert_eq!(b.as_f32_slice(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
/// ```
pub fn to_buffer(array: &NestedArray, kind: ElementKind) -> Result<FlatBuffer, TensorError> {
    let (shape, source) = introspect::inspect(array)?;
    let mut data = BufferData::with_capacity(kind, shape.num_elements());
    for leaf in array.leaves() {
        if source == Some(kind) {
            data.push(leaf.clone())?;
        } else {
            data.push(coerce::coerce(leaf, kind)?)?;
        }
    }
    tracing::trace!(shape = %shape, kind = %kind, source = ?source, "marshalled array to buffer");
    FlatBuffer::new(shape, data)
}

/// Flattens `array` into a buffer of its own inferred kind.
///
/// Fails with [`TensorError::EmptyArray`] if the array has no elements.
pub fn to_buffer_inferred(array: &NestedArray) -> Result<FlatBuffer, TensorError> {
    let (_, kind) = introspect::introspect(array)?;
    to_buffer(array, kind)
}

/// Rebuilds the nested array described by a buffer's shape and contents.
///
/// Fails with [`TensorError::Structural`] when the nested form cannot be
/// allocated, as with `[1 << 40, 0]`: an empty buffer whose shape still
/// describes 2^40 empty sub-arrays.
pub fn from_buffer(buffer: &FlatBuffer) -> Result<NestedArray, TensorError> {
    check_nested_size::<NestedArray>(buffer.shape())?;
    let mut values = buffer.scalars();
    rebuild(buffer.shape().dims(), &mut || {
        values
            .next()
            .unwrap_or_else(|| Err(TensorError::structural("buffer exhausted before shape was filled")))
    })
}

/// Rebuilds the nested array and coerces every element to `kind`.
pub fn from_buffer_as(buffer: &FlatBuffer, kind: ElementKind) -> Result<NestedArray, TensorError> {
    from_buffer(&coerce_buffer(buffer, kind)?)
}

fn rebuild(
    dims: &[usize],
    next: &mut dyn FnMut() -> Result<Scalar, TensorError>,
) -> Result<NestedArray, TensorError> {
    match dims.split_first() {
        None => next().map(NestedArray::Scalar),
        Some((&len, rest)) => {
            let mut items = reserve_children(len)?;
            for _ in 0..len {
                items.push(rebuild(rest, next)?);
            }
            Ok(NestedArray::Seq(items))
        }
    }
}

/// Expands a text array into its UTF-8 byte form, adding one dimension.
pub fn strings_to_bytes(array: &NestedArray) -> Result<NestedBytes, TensorError> {
    match array {
        NestedArray::Scalar(Scalar::Text(s)) => Ok(NestedBytes::Bytes(s.as_bytes().to_vec())),
        NestedArray::Scalar(other) => Err(TensorError::coercion(
            other.kind(),
            ElementKind::UInt8,
            other.to_string(),
            "only text elements have a byte-sequence form",
        )),
        NestedArray::Seq(items) => items
            .iter()
            .map(strings_to_bytes)
            .collect::<Result<_, _>>()
            .map(NestedBytes::Seq),
    }
}

/// Collapses UTF-8 byte sequences back into text, removing one dimension.
pub fn bytes_to_strings(bytes: &NestedBytes) -> Result<NestedArray, TensorError> {
    match bytes {
        NestedBytes::Bytes(raw) => decode_utf8(raw).map(NestedArray::Scalar),
        NestedBytes::Seq(items) => items
            .iter()
            .map(bytes_to_strings)
            .collect::<Result<_, _>>()
            .map(NestedArray::Seq),
    }
}

/// Packs a byte-form text array into a text buffer.
pub fn bytes_to_buffer(bytes: &NestedBytes) -> Result<FlatBuffer, TensorError> {
    to_buffer(&bytes_to_strings(bytes)?, ElementKind::Text)
}

/// Unpacks a text buffer into its byte form without decoding.
pub fn buffer_to_bytes(buffer: &FlatBuffer) -> Result<NestedBytes, TensorError> {
    let elements = buffer.as_text_bytes().ok_or_else(|| {
        TensorError::structural(format!("expected a text buffer, found {}", buffer.kind()))
    })?;
    check_nested_size::<NestedBytes>(buffer.shape())?;
    let mut iter = elements.iter();
    rebuild_bytes(buffer.shape().dims(), &mut iter)
}

fn rebuild_bytes<'a>(
    dims: &[usize],
    iter: &mut impl Iterator<Item = &'a Vec<u8>>,
) -> Result<NestedBytes, TensorError> {
    match dims.split_first() {
        None => iter
            .next()
            .map(|b| NestedBytes::Bytes(b.clone()))
            .ok_or_else(|| TensorError::structural("buffer exhausted before shape was filled")),
        Some((&len, rest)) => {
            let mut items = reserve_children(len)?;
            for _ in 0..len {
                items.push(rebuild_bytes(rest, iter)?);
            }
            Ok(NestedBytes::Seq(items))
        }
    }
}

/// Checks that the nested form of `shape`, built from nodes of type `T`,
/// has an addressable size.
///
/// Every dimension contributes one node per entry of the dimensions above
/// it; counting stops below the first zero extent.
fn check_nested_size<T>(shape: &Shape) -> Result<(), TensorError> {
    let too_large = || TensorError::structural(format!("nested form of shape {shape} is too large"));
    let mut nodes = 1usize;
    let mut level = 1usize;
    for &extent in shape.dims() {
        level = level.checked_mul(extent).ok_or_else(too_large)?;
        nodes = nodes.checked_add(level).ok_or_else(too_large)?;
        if level == 0 {
            break;
        }
    }
    let bytes = nodes
        .checked_mul(std::mem::size_of::<T>())
        .ok_or_else(too_large)?;
    if bytes > isize::MAX as usize {
        return Err(too_large());
    }
    Ok(())
}

fn reserve_children<T>(len: usize) -> Result<Vec<T>, TensorError> {
    let mut items = Vec::new();
    items.try_reserve_exact(len).map_err(|e| {
        TensorError::structural(format!("cannot allocate {len} sub-arrays: {e}"))
    })?;
    Ok(items)
}

/// Shape of the logical text array a byte-form value represents.
pub fn logical_shape(bytes: &NestedBytes) -> Result<Shape, TensorError> {
    introspect::shape_of(&bytes_to_strings(bytes)?)
}
