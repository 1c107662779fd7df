// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for requests and result access.

use crate::backend::SharedBackendError;
use crate::RequestState;
use std::fmt;
use tensor_core::TensorError;

/// Which side of a signature a name was looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Errors that can occur while building, submitting or reading a request.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// An input name was bound twice in one request.
    #[error("input '{name}' is already bound")]
    DuplicateBinding { name: String },

    /// A bound input or requested output is not declared by the signature.
    #[error("signature '{signature}' declares no {direction} named '{name}'")]
    UnknownBinding {
        name: String,
        direction: Direction,
        signature: String,
    },

    /// A builder operation was invoked outside the `Building` state.
    #[error("cannot {op}: request is {state}")]
    InvalidState { op: &'static str, state: RequestState },

    /// The selected or configured signature does not exist on the backend.
    #[error("backend has no signature named '{signature}'")]
    UnknownSignature { signature: String },

    /// No signature was selected and neither config nor backend names a default.
    #[error("no signature selected and the backend declares no default")]
    NoDefaultSignature,

    /// Converting a bound input into a buffer failed.
    #[error("cannot marshal input '{name}': {source}")]
    MarshalError {
        name: String,
        #[source]
        source: TensorError,
    },

    /// The backend failed; its error is passed through unchanged.
    #[error("backend execution failed for signature '{signature}': {source}")]
    BackendExecution {
        signature: String,
        #[source]
        source: SharedBackendError,
    },

    /// The backend did not return a requested output.
    #[error("backend returned no output '{name}' for signature '{signature}'")]
    MissingOutput { name: String, signature: String },

    /// A result was asked for an output that was not requested.
    #[error("output '{name}' was not requested")]
    UnknownOutput { name: String },

    /// Reading an output in the requested form failed.
    #[error("cannot read output '{name}': {source}")]
    ViewError {
        name: String,
        #[source]
        source: TensorError,
    },

    /// Signature loading or validation failed.
    #[error("signature error: {0}")]
    SignatureError(#[from] signature_ir::SignatureError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl RuntimeError {
    /// The underlying marshalling or coercion error, if any.
    pub fn tensor_error(&self) -> Option<&TensorError> {
        match self {
            RuntimeError::MarshalError { source, .. } | RuntimeError::ViewError { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_messages_carry_context() {
        let e = RuntimeError::UnknownBinding {
            name: "doesNotExist".into(),
            direction: Direction::Input,
            signature: "concat".into(),
        };
        assert_eq!(
            e.to_string(),
            "signature 'concat' declares no input named 'doesNotExist'"
        );

        let e = RuntimeError::InvalidState {
            op: "bind_input",
            state: RequestState::Completed,
        };
        assert_eq!(e.to_string(), "cannot bind_input: request is completed");
    }

    #[test]
    fn test_tensor_error_source() {
        let e = RuntimeError::ViewError {
            name: "out".into(),
            source: TensorError::EmptyArray { detail: "x".into() },
        };
        assert!(matches!(e.tensor_error(), Some(TensorError::EmptyArray { .. })));
        assert!(e.source().is_some());
        assert!(RuntimeError::NoDefaultSignature.tensor_error().is_none());
    }
}
