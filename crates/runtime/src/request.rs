// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The fluent request protocol.
//!
//! ```text
//! Building ── bind_input / bind_buffer / request_output / select_signature
//!     │  .submit()
//!     ▼
//! Submitted ── names checked, inputs marshalled, backend called
//!     │
//!     ├──▶ Completed (ExecutionResult returned)
//!     └──▶ Failed    (error returned; backend errors also kept on the builder)
//! ```
//!
//! A builder is single-use: once submitted, every further operation fails
//! with [`RuntimeError::InvalidState`]. Mutating methods take `&mut self`,
//! so one builder cannot be driven from two tasks at once.

use crate::backend::SharedBackendError;
use crate::error::Direction;
use crate::{Backend, ExecutionResult, RequestMetrics, RuntimeError, Session, TensorMap};
use signature_ir::{SignatureDef, TensorSpec};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tensor_core::{coerce, introspect, marshal, FlatBuffer, NestedArray, TensorError};

/// Lifecycle of a [`RequestBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Building,
    Submitted,
    Completed,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestState::Building => "building",
            RequestState::Submitted => "submitted",
            RequestState::Completed => "completed",
            RequestState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A value bound to an input name.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A nested array, marshalled on submit.
    Array(NestedArray),
    /// An already-shaped buffer, passed through (or coerced) on submit.
    Buffer(FlatBuffer),
}

/// Accumulates bindings and output requests for one backend call.
///
/// # Example
/// ```
/// # use runtime::{FnBackend, Session, TensorMap};
/// # use signature_ir::{SignatureDef, SignatureSet, TensorSpec};
/// # use tensor_core::{ElementKind, FlatBuffer};
/// # let sig = SignatureDef::new("concat")
/// #     .with_input(TensorSpec::new("a", ElementKind::Text))
/// #     .with_input(TensorSpec::new("b", ElementKind::Text))
/// #     .with_output(TensorSpec::new("concat", ElementKind::Text));
/// # let set = SignatureSet::new(vec![sig], None).validate().unwrap();
/// # let backend = FnBackend::new(set, |_sig, inputs: &TensorMap| {
/// #     let a: String = inputs["a"].to_vec::<String>()?.concat();
/// #     let b: String = inputs["b"].to_vec::<String>()?.concat();
/// #     Ok(TensorMap::from([("concat".to_string(), FlatBuffer::scalar(a + &b))]))
/// # });
/// let session = Session::new(backend);
/// let mut request = session.request();
/// request
///     .bind_input("a", "foo")?
///     .bind_input("b", "bar")?
///     .request_output("concat")?;
/// let result = request.submit()?;
/// assert_eq!(result.output("concat")?.scalar::<String>()?, "foobar");
/// # Ok::<(), runtime::RuntimeError>(())
/// ```
pub struct RequestBuilder<'s, B: Backend> {
    session: &'s Session<B>,
    state: RequestState,
    signature: Option<String>,
    bindings: Vec<(String, Binding)>,
    outputs: Vec<String>,
    backend_error: Option<SharedBackendError>,
}

impl<'s, B: Backend> RequestBuilder<'s, B> {
    pub(crate) fn new(session: &'s Session<B>) -> Self {
        Self {
            session,
            state: RequestState::Building,
            signature: None,
            bindings: Vec::new(),
            outputs: Vec::new(),
            backend_error: None,
        }
    }

    /// Binds a nested array, or anything convertible into one (scalars,
    /// vectors, fixed-size arrays), to an input name.
    ///
    /// Fails with [`RuntimeError::DuplicateBinding`] if the name is already bound.
    pub fn bind_input(
        &mut self,
        name: impl Into<String>,
        value: impl Into<NestedArray>,
    ) -> Result<&mut Self, RuntimeError> {
        self.bind(name.into(), Binding::Array(value.into()), "bind_input")
    }

    /// Binds an already-shaped buffer to an input name.
    pub fn bind_buffer(
        &mut self,
        name: impl Into<String>,
        buffer: FlatBuffer,
    ) -> Result<&mut Self, RuntimeError> {
        self.bind(name.into(), Binding::Buffer(buffer), "bind_buffer")
    }

    /// Registers interest in an output. Requesting the same name twice is a no-op.
    ///
    /// When no output is requested, every output the signature declares is
    /// requested on submit.
    pub fn request_output(&mut self, name: impl Into<String>) -> Result<&mut Self, RuntimeError> {
        self.ensure_building("request_output")?;
        let name = name.into();
        if !self.outputs.contains(&name) {
            self.outputs.push(name);
        }
        Ok(self)
    }

    /// Selects the signature to execute instead of the default.
    pub fn select_signature(&mut self, name: impl Into<String>) -> Result<&mut Self, RuntimeError> {
        self.ensure_building("select_signature")?;
        self.signature = Some(name.into());
        Ok(self)
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Bound input names, in binding order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Requested output names, in request order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }

    /// The backend's error, if the request failed inside the backend.
    pub fn backend_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.backend_error.as_deref()
    }

    /// Validates, marshals and executes the request.
    ///
    /// Steps:
    /// 1. Resolve the signature (selected, then configured default, then backend default).
    /// 2. Check every bound and requested name against it. Nothing is
    ///    marshalled and the backend is not called if any name is unknown.
    /// 3. Marshal each input to its declared kind and check declared shapes.
    /// 4. Call the backend.
    /// 5. Collect the requested outputs, in request order.
    pub fn submit(&mut self) -> Result<ExecutionResult, RuntimeError> {
        self.ensure_building("submit")?;
        self.state = RequestState::Submitted;
        let outcome = self.execute();
        self.state = match &outcome {
            Ok(_) => RequestState::Completed,
            Err(e) => {
                tracing::debug!("request failed: {e}");
                RequestState::Failed
            }
        };
        outcome
    }

    // ── Private helpers ────────────────────────────────────────

    fn bind(
        &mut self,
        name: String,
        binding: Binding,
        op: &'static str,
    ) -> Result<&mut Self, RuntimeError> {
        self.ensure_building(op)?;
        if self.bindings.iter().any(|(bound, _)| *bound == name) {
            return Err(RuntimeError::DuplicateBinding { name });
        }
        self.bindings.push((name, binding));
        Ok(self)
    }

    fn ensure_building(&self, op: &'static str) -> Result<(), RuntimeError> {
        if self.state != RequestState::Building {
            return Err(RuntimeError::InvalidState {
                op,
                state: self.state,
            });
        }
        Ok(())
    }

    fn resolve_signature(&self) -> Result<&'s SignatureDef, RuntimeError> {
        let session = self.session;
        let name = self
            .signature
            .as_deref()
            .or(session.config().default_signature.as_deref())
            .or_else(|| session.backend().default_signature())
            .ok_or(RuntimeError::NoDefaultSignature)?;
        session
            .backend()
            .signature(name)
            .ok_or_else(|| RuntimeError::UnknownSignature {
                signature: name.to_string(),
            })
    }

    fn execute(&mut self) -> Result<ExecutionResult, RuntimeError> {
        let start = Instant::now();
        let session = self.session;
        let config = session.config();

        let signature = self.resolve_signature()?;
        tracing::debug!("submitting request against {}", signature.summary());

        for (name, _) in &self.bindings {
            if signature.input(name).is_none() {
                return Err(RuntimeError::UnknownBinding {
                    name: name.clone(),
                    direction: Direction::Input,
                    signature: signature.name.clone(),
                });
            }
        }
        for name in &self.outputs {
            if signature.output(name).is_none() {
                return Err(RuntimeError::UnknownBinding {
                    name: name.clone(),
                    direction: Direction::Output,
                    signature: signature.name.clone(),
                });
            }
        }
        let requested: Vec<String> = if self.outputs.is_empty() {
            signature.output_names().map(str::to_string).collect()
        } else {
            self.outputs.clone()
        };
        for declared in signature.input_names() {
            if !self.bindings.iter().any(|(name, _)| name == declared) {
                tracing::debug!("input '{declared}' of '{}' is not bound", signature.name);
            }
        }

        // Marshal.
        let marshal_start = Instant::now();
        let mut metrics = RequestMetrics::new();
        let mut inputs = TensorMap::new();
        for (name, binding) in std::mem::take(&mut self.bindings) {
            // Presence was checked above.
            let Some(spec) = signature.input(&name) else {
                continue;
            };
            let (buffer, coerced) = marshal_input(&name, binding, spec, config.coerce_inputs)
                .and_then(|(buffer, coerced)| {
                    if config.check_declared_shapes && !spec.accepts_shape(buffer.shape()) {
                        return Err(TensorError::ShapeMismatch {
                            op: "bind_input",
                            expected: spec
                                .shape
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_default(),
                            actual: buffer.shape().clone(),
                        });
                    }
                    Ok((buffer, coerced))
                })
                .map_err(|source| RuntimeError::MarshalError {
                    name: name.clone(),
                    source,
                })?;
            tracing::debug!(
                "input '{name}': {} {} ({} elements{})",
                buffer.kind(),
                buffer.shape(),
                buffer.len(),
                if coerced { ", coerced" } else { "" }
            );
            metrics.record_input(buffer.len(), coerced);
            inputs.insert(name, buffer);
        }
        let marshal_duration = marshal_start.elapsed();

        // Execute.
        let backend_start = Instant::now();
        let mut returned = session
            .backend()
            .execute(signature, inputs, &requested)
            .map_err(|e| {
                let shared: SharedBackendError = Arc::from(e);
                self.backend_error = Some(Arc::clone(&shared));
                RuntimeError::BackendExecution {
                    signature: signature.name.clone(),
                    source: shared,
                }
            })?;
        let backend_duration = backend_start.elapsed();

        // Collect.
        let mut outputs = Vec::with_capacity(requested.len());
        for name in requested {
            let buffer = returned.remove(&name).ok_or_else(|| RuntimeError::MissingOutput {
                name: name.clone(),
                signature: signature.name.clone(),
            })?;
            metrics.record_output(buffer.len());
            outputs.push((name, buffer));
        }
        for extra in returned.keys() {
            tracing::warn!("backend returned unrequested output '{extra}'; dropping it");
        }

        metrics.finalise(marshal_duration, backend_duration, start.elapsed());
        let metrics = if config.enable_profiling {
            tracing::info!("{}", metrics.summary());
            Some(metrics)
        } else {
            None
        };

        Ok(ExecutionResult::new(
            signature.name.clone(),
            outputs,
            metrics,
            config.scalar_policy,
        ))
    }
}

/// Converts one binding into a buffer for `spec`. The flag reports whether
/// the element kind was converted.
fn marshal_input(
    name: &str,
    binding: Binding,
    spec: &TensorSpec,
    coerce_inputs: bool,
) -> Result<(FlatBuffer, bool), TensorError> {
    match binding {
        Binding::Array(array) => {
            let natural = introspect::infer_kind(&array);
            let target = match natural {
                Some(kind) if !coerce_inputs => kind,
                _ => spec.kind,
            };
            let buffer = marshal::to_buffer(&array, target)?;
            Ok((buffer, natural.is_some_and(|k| k != target)))
        }
        Binding::Buffer(buffer) if coerce_inputs && buffer.kind() != spec.kind => {
            tracing::warn!(
                "bound buffer '{name}' has kind {}, converting to declared {}",
                buffer.kind(),
                spec.kind
            );
            Ok((coerce::coerce_buffer(&buffer, spec.kind)?, true))
        }
        Binding::Buffer(buffer) => Ok((buffer, false)),
    }
}

impl<B: Backend> fmt::Debug for RequestBuilder<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("state", &self.state)
            .field("signature", &self.signature)
            .field("inputs", &self.input_names().collect::<Vec<_>>())
            .field("outputs", &self.outputs)
            .finish()
    }
}
