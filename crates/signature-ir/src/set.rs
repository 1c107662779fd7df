// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The full set of signatures a backend exposes.
//!
//! # Type-State Pattern
//!
//! ```text
//! SignatureSet<Loaded>    : signatures parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! SignatureSet<Validated> : names unique, default resolved, ready to serve requests.
//! ```
//!
//! Lookups are only available on the validated state, so a backend can
//! never answer requests from a set with duplicate or dangling names.

use crate::{SignatureDef, SignatureError, SignatureManifest};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: set has been loaded but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: set has been validated.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for set states.
pub trait SetState: fmt::Debug + Clone {}
impl SetState for Loaded {}
impl SetState for Validated {}

// ── SignatureSet ───────────────────────────────────────────────────

/// An ordered collection of signatures with an optional default.
#[derive(Debug, Clone)]
pub struct SignatureSet<S: SetState = Loaded> {
    signatures: Vec<SignatureDef>,
    default_signature: Option<String>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl SignatureSet<Loaded> {
    /// Creates a set in the `Loaded` state.
    pub fn new(signatures: Vec<SignatureDef>, default_signature: Option<String>) -> Self {
        Self {
            signatures,
            default_signature,
            _state: std::marker::PhantomData,
        }
    }

    /// Builds a set from a parsed manifest, validating the manifest first.
    pub fn from_manifest(manifest: &SignatureManifest) -> Result<Self, SignatureError> {
        manifest.validate()?;
        Ok(Self::new(
            manifest.to_signatures()?,
            manifest.default_signature.clone(),
        ))
    }

    /// Loads, parses and validates a manifest file.
    pub fn load(path: &Path) -> Result<SignatureSet<Validated>, SignatureError> {
        let manifest = SignatureManifest::from_file(path)?;
        Self::from_manifest(&manifest)?.validate()
    }

    /// Validates the set and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The set is non-empty.
    /// - Signature names are unique.
    /// - Every signature passes [`SignatureDef::validate`].
    /// - The default, if named, refers to a declared signature.
    ///
    /// When no default is named, the first signature becomes the default.
    pub fn validate(self) -> Result<SignatureSet<Validated>, SignatureError> {
        let first = match self.signatures.first() {
            Some(first) => first.name.clone(),
            None => {
                return Err(SignatureError::InvalidSet(
                    "signature set contains no signatures".into(),
                ))
            }
        };

        let mut seen = HashSet::new();
        for sig in &self.signatures {
            if !seen.insert(sig.name.as_str()) {
                return Err(SignatureError::InvalidSet(format!(
                    "duplicate signature '{}'",
                    sig.name
                )));
            }
            sig.validate()?;
        }

        let default_signature = match self.default_signature {
            Some(name) if !seen.contains(name.as_str()) => {
                return Err(SignatureError::InvalidSet(format!(
                    "default signature '{name}' is not declared"
                )));
            }
            Some(name) => name,
            None => first,
        };

        tracing::debug!(
            "validated {} signatures (default '{}')",
            self.signatures.len(),
            default_signature
        );

        Ok(SignatureSet {
            signatures: self.signatures,
            default_signature: Some(default_signature),
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl SignatureSet<Validated> {
    /// Looks up a signature by name.
    pub fn get(&self, name: &str) -> Option<&SignatureDef> {
        self.signatures.iter().find(|s| s.name == name)
    }

    /// Name of the signature used when a request selects none.
    pub fn default_name(&self) -> &str {
        self.default_signature.as_deref().unwrap_or_default()
    }

    /// The signature used when a request selects none.
    pub fn default_signature(&self) -> Option<&SignatureDef> {
        self.get(self.default_name())
    }

    /// Returns an iterator over the signatures in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SignatureDef> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Converts the set back into a manifest.
    pub fn to_manifest(&self) -> SignatureManifest {
        SignatureManifest::from_signatures(&self.signatures, Some(self.default_name()))
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: SetState> fmt::Display for SignatureSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SignatureSet ({} signatures):", self.signatures.len())?;
        for sig in &self.signatures {
            writeln!(f, "  {}", sig.summary())?;
        }
        Ok(())
    }
}
