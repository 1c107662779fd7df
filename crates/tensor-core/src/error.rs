// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for introspection, coercion and marshalling.

use crate::{ElementKind, Shape};

/// Errors that can occur while inspecting, converting or marshalling arrays.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TensorError {
    /// Sibling sub-arrays disagree in length or nesting depth, or a buffer's
    /// element count does not match its shape.
    #[error("structural error: {detail}")]
    Structural { detail: String },

    /// No scalar could be reached, so the element kind cannot be inferred.
    #[error("cannot infer element kind: {detail}")]
    EmptyArray { detail: String },

    /// A value cannot be converted between two element kinds.
    #[error("cannot coerce {value:?} from {from} to {to}: {reason}")]
    Coercion {
        from: ElementKind,
        to: ElementKind,
        value: String,
        reason: String,
    },

    /// The requested access shape is incompatible with the actual shape.
    #[error("shape mismatch in {op}: expected {expected}, got {actual}")]
    ShapeMismatch {
        op: &'static str,
        expected: String,
        actual: Shape,
    },

    /// A raw byte buffer does not match `product(shape) * width`.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },
}

impl TensorError {
    pub(crate) fn structural(detail: impl Into<String>) -> Self {
        TensorError::Structural {
            detail: detail.into(),
        }
    }

    pub(crate) fn coercion(
        from: ElementKind,
        to: ElementKind,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TensorError::Coercion {
            from,
            to,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
