// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The seam between requests and the computation that serves them.
//!
//! A [`Backend`] declares its signatures and executes one of them on a map
//! of named input buffers. The call is synchronous and opaque: whatever
//! the backend does internally (a model runtime, a remote service, a test
//! double), requests only see buffers in and buffers (or an error) out.

use signature_ir::{set::Validated, SignatureDef, SignatureSet};
use std::collections::BTreeMap;
use std::sync::Arc;
use tensor_core::FlatBuffer;

/// Named buffers passed to or returned from a backend.
pub type TensorMap = BTreeMap<String, FlatBuffer>;

/// Opaque error reported by a backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// A backend error shared between the failed request and its caller.
pub type SharedBackendError = Arc<dyn std::error::Error + Send + Sync>;

/// An external computation that requests are submitted to.
pub trait Backend: Send + Sync {
    /// Signature used when neither the request nor the config selects one.
    fn default_signature(&self) -> Option<&str>;

    /// Looks up a declared signature.
    fn signature(&self, name: &str) -> Option<&SignatureDef>;

    /// Runs `signature` on `inputs`, producing (at least) the `outputs` named.
    ///
    /// Inputs have already been checked against the signature and marshalled
    /// to its declared kinds.
    fn execute(
        &self,
        signature: &SignatureDef,
        inputs: TensorMap,
        outputs: &[String],
    ) -> Result<TensorMap, BackendError>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn default_signature(&self) -> Option<&str> {
        (**self).default_signature()
    }

    fn signature(&self, name: &str) -> Option<&SignatureDef> {
        (**self).signature(name)
    }

    fn execute(
        &self,
        signature: &SignatureDef,
        inputs: TensorMap,
        outputs: &[String],
    ) -> Result<TensorMap, BackendError> {
        (**self).execute(signature, inputs, outputs)
    }
}

/// A backend made of a validated signature set and a closure.
///
/// Useful for wrapping a host computation or for test doubles.
///
/// # Example
/// ```
/// use runtime::{FnBackend, Session, TensorMap};
/// use signature_ir::{SignatureDef, SignatureSet, TensorSpec};
/// use tensor_core::{ElementKind, FlatBuffer};
///
/// let sig = SignatureDef::new("negate")
///     .with_input(TensorSpec::new("x", ElementKind::Int32))
///     .with_output(TensorSpec::new("y", ElementKind::Int32));
/// let set = SignatureSet::new(vec![sig], None).validate().unwrap();
///
/// let backend = FnBackend::new(set, |_sig, inputs: &TensorMap| {
///     let x: Vec<i32> = inputs["x"].to_vec()?;
///     let y: Vec<i32> = x.iter().map(|v| -v).collect();
///     let mut out = TensorMap::new();
///     out.insert("y".into(), FlatBuffer::from_vec(inputs["x"].shape().clone(), y)?);
///     Ok(out)
/// });
///
/// let session = Session::new(backend);
/// let mut request = session.request();
/// request.bind_input("x", vec![1i32, -2])?.request_output("y")?;
/// let result = request.submit()?;
/// assert_eq!(result.output("y")?.array::<i32>()?, vec![-1, 2]);
/// # Ok::<(), runtime::RuntimeError>(())
/// ```
pub struct FnBackend<F> {
    signatures: SignatureSet<Validated>,
    run: F,
}

impl<F> FnBackend<F>
where
    F: Fn(&SignatureDef, &TensorMap) -> Result<TensorMap, BackendError> + Send + Sync,
{
    pub fn new(signatures: SignatureSet<Validated>, run: F) -> Self {
        Self { signatures, run }
    }

    pub fn signatures(&self) -> &SignatureSet<Validated> {
        &self.signatures
    }
}

impl<F> Backend for FnBackend<F>
where
    F: Fn(&SignatureDef, &TensorMap) -> Result<TensorMap, BackendError> + Send + Sync,
{
    fn default_signature(&self) -> Option<&str> {
        Some(self.signatures.default_name())
    }

    fn signature(&self, name: &str) -> Option<&SignatureDef> {
        self.signatures.get(name)
    }

    fn execute(
        &self,
        signature: &SignatureDef,
        inputs: TensorMap,
        _outputs: &[String],
    ) -> Result<TensorMap, BackendError> {
        (self.run)(signature, &inputs)
    }
}

impl<F> std::fmt::Debug for FnBackend<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBackend")
            .field("signatures", &self.signatures.len())
            .field("default", &self.signatures.default_name())
            .finish()
    }
}
