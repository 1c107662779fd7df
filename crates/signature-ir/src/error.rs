// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for signature declarations and manifests.

/// Errors that can occur when loading or validating signatures.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The manifest file could not be read.
    #[error("failed to read signature manifest: {0}")]
    ManifestReadError(#[from] std::io::Error),

    /// The manifest JSON is malformed.
    #[error("failed to parse signature manifest: {0}")]
    ManifestParseError(#[from] serde_json::Error),

    /// A tensor declares an element kind that is not recognised.
    #[error("tensor '{tensor}' in signature '{signature}' has unknown kind '{kind}'")]
    UnknownKind {
        signature: String,
        tensor: String,
        kind: String,
    },

    /// A single signature is malformed (e.g., duplicate tensor names).
    #[error("invalid signature '{signature}': {detail}")]
    InvalidSignature { signature: String, detail: String },

    /// The set of signatures as a whole is malformed.
    #[error("invalid signature set: {0}")]
    InvalidSet(String),
}
