// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed, read-only access to the buffers a request produced.

use crate::{RequestMetrics, RuntimeError, ScalarPolicy};
use tensor_core::{
    marshal, Element, ElementKind, FlatBuffer, NestedArray, NestedBytes, Scalar, Shape,
    TensorError,
};

/// The outputs of one completed request, in request order.
///
/// Owned by the caller; nothing inside is shared with the session.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    signature: String,
    outputs: Vec<(String, FlatBuffer)>,
    metrics: Option<RequestMetrics>,
    scalar_policy: ScalarPolicy,
}

impl ExecutionResult {
    pub(crate) fn new(
        signature: String,
        outputs: Vec<(String, FlatBuffer)>,
        metrics: Option<RequestMetrics>,
        scalar_policy: ScalarPolicy,
    ) -> Self {
        Self {
            signature,
            outputs,
            metrics,
            scalar_policy,
        }
    }

    /// Name of the signature that was executed.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Output names, in request order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// The raw buffer of an output.
    pub fn buffer(&self, name: &str) -> Option<&FlatBuffer> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, buffer)| buffer)
    }

    /// A typed view of an output.
    ///
    /// Fails with [`RuntimeError::UnknownOutput`] if `name` was not requested.
    pub fn output(&self, name: &str) -> Result<ResultView<'_>, RuntimeError> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(found, buffer)| ResultView {
                name: found.as_str(),
                buffer,
                policy: self.scalar_policy,
            })
            .ok_or_else(|| RuntimeError::UnknownOutput {
                name: name.to_string(),
            })
    }

    /// Profiling figures, when profiling is enabled.
    pub fn metrics(&self) -> Option<&RequestMetrics> {
        self.metrics.as_ref()
    }

    /// Consumes the result, yielding the raw buffers in request order.
    pub fn into_buffers(self) -> Vec<(String, FlatBuffer)> {
        self.outputs
    }
}

/// Read-only accessor over one output buffer.
///
/// Every extraction converts from the buffer's kind to the requested one
/// following [`tensor_core::coerce`]. Shapes are never silently truncated:
/// asking for a scalar or a vector from a buffer of another shape fails
/// with [`TensorError::ShapeMismatch`].
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'r> {
    name: &'r str,
    buffer: &'r FlatBuffer,
    policy: ScalarPolicy,
}

impl<'r> ResultView<'r> {
    pub fn name(&self) -> &'r str {
        self.name
    }

    pub fn buffer(&self) -> &'r FlatBuffer {
        self.buffer
    }

    pub fn shape(&self) -> &'r Shape {
        self.buffer.shape()
    }

    pub fn kind(&self) -> ElementKind {
        self.buffer.kind()
    }

    /// Reads the output as a single value of `kind`.
    ///
    /// Under [`ScalarPolicy::Strict`] the output must be rank 0; under
    /// [`ScalarPolicy::SingleElement`] it must hold exactly one element.
    pub fn as_scalar(&self, kind: ElementKind) -> Result<Scalar, RuntimeError> {
        self.wrap(|| {
            let shape = self.buffer.shape();
            let (ok, expected) = match self.policy {
                ScalarPolicy::Strict => (shape.is_scalar(), "rank 0"),
                ScalarPolicy::SingleElement => (self.buffer.len() == 1, "exactly one element"),
            };
            if !ok {
                return Err(TensorError::ShapeMismatch {
                    op: "as_scalar",
                    expected: expected.into(),
                    actual: shape.clone(),
                });
            }
            let value = self
                .buffer
                .scalars()
                .next()
                .unwrap_or_else(|| Err(TensorError::EmptyArray { detail: "no element".into() }))?;
            value.coerce(kind)
        })
    }

    /// Reads a rank-1 output as a vector of `kind`.
    pub fn as_array(&self, kind: ElementKind) -> Result<Vec<Scalar>, RuntimeError> {
        self.wrap(|| {
            self.expect_rank(1, "as_array")?;
            self.flat_scalars(kind)
        })
    }

    /// Reads the output as a nested array of `kind`, of any rank.
    pub fn as_multidimensional(&self, kind: ElementKind) -> Result<NestedArray, RuntimeError> {
        self.wrap(|| marshal::from_buffer_as(self.buffer, kind))
    }

    /// Reads every element in row-major order as `kind`, whatever the rank.
    pub fn as_flat(&self, kind: ElementKind) -> Result<Vec<Scalar>, RuntimeError> {
        self.wrap(|| self.flat_scalars(kind))
    }

    /// Typed form of [`ResultView::as_scalar`].
    ///
    /// # Examples
    /// A boolean output can be read as bytes or as text:
    /// `view.scalar::<u8>()` yields `1` for `true`, `view.scalar::<String>()` yields `"true"`.
    pub fn scalar<T: Element>(&self) -> Result<T, RuntimeError> {
        let value = self.as_scalar(T::KIND)?;
        self.wrap(|| value.to::<T>())
    }

    /// Typed form of [`ResultView::as_array`].
    pub fn array<T: Element>(&self) -> Result<Vec<T>, RuntimeError> {
        self.wrap(|| {
            self.expect_rank(1, "as_array")?;
            self.buffer.to_vec::<T>()
        })
    }

    /// Typed form of [`ResultView::as_flat`].
    pub fn flat<T: Element>(&self) -> Result<Vec<T>, RuntimeError> {
        self.wrap(|| self.buffer.to_vec::<T>())
    }

    /// Reads the output into an `ndarray` of `T`.
    pub fn to_ndarray<T: Element>(&self) -> Result<ndarray::ArrayD<T>, RuntimeError> {
        self.wrap(|| self.buffer.to_ndarray::<T>())
    }

    /// Reads a text output in its byte-sequence form (one extra dimension).
    pub fn as_text_bytes(&self) -> Result<NestedBytes, RuntimeError> {
        self.wrap(|| marshal::buffer_to_bytes(self.buffer))
    }

    /// Index of the largest element of a rank-1 output.
    pub fn arg_max(&self) -> Result<usize, RuntimeError> {
        self.wrap(|| self.buffer.arg_max())
    }

    /// Per-row index of the largest element of a rank-2 output.
    pub fn arg_max_rows(&self) -> Result<Vec<usize>, RuntimeError> {
        self.wrap(|| self.buffer.arg_max_rows())
    }

    // ── Private helpers ────────────────────────────────────────

    fn wrap<T>(&self, f: impl FnOnce() -> Result<T, TensorError>) -> Result<T, RuntimeError> {
        f().map_err(|source| RuntimeError::ViewError {
            name: self.name.to_string(),
            source,
        })
    }

    fn expect_rank(&self, rank: usize, op: &'static str) -> Result<(), TensorError> {
        let shape = self.buffer.shape();
        if shape.rank() != rank {
            return Err(TensorError::ShapeMismatch {
                op,
                expected: format!("rank {rank}"),
                actual: shape.clone(),
            });
        }
        Ok(())
    }

    fn flat_scalars(&self, kind: ElementKind) -> Result<Vec<Scalar>, TensorError> {
        self.buffer
            .scalars()
            .map(|value| value?.coerce(kind))
            .collect()
    }
}
