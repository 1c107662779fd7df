// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A single computation signature: the named inputs it accepts and the
//! named outputs it produces.

use crate::{SignatureError, TensorSpec};
use std::collections::HashSet;
use std::fmt;

/// Declaration of one computation a backend can run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignatureDef {
    /// Signature identifier (e.g., `"serving_default"`).
    pub name: String,
    /// Inputs, in declaration order.
    pub inputs: Vec<TensorSpec>,
    /// Outputs, in declaration order.
    pub outputs: Vec<TensorSpec>,
}

impl SignatureDef {
    /// Creates a signature with no inputs or outputs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Adds an input declaration.
    pub fn with_input(mut self, spec: TensorSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    /// Adds an output declaration.
    pub fn with_output(mut self, spec: TensorSpec) -> Self {
        self.outputs.push(spec);
        self
    }

    /// Looks up an input by name.
    pub fn input(&self, name: &str) -> Option<&TensorSpec> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Looks up an output by name.
    pub fn output(&self, name: &str) -> Option<&TensorSpec> {
        self.outputs.iter().find(|s| s.name == name)
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|s| s.name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|s| s.name.as_str())
    }

    /// Checks that the signature is internally consistent.
    ///
    /// # Checks
    /// - The name is non-empty.
    /// - No two inputs share a name, and no two outputs share a name.
    /// - Every tensor name is non-empty.
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.name.is_empty() {
            return Err(SignatureError::InvalidSignature {
                signature: self.name.clone(),
                detail: "signature name is empty".into(),
            });
        }
        for (side, specs) in [("input", &self.inputs), ("output", &self.outputs)] {
            let mut seen = HashSet::new();
            for spec in specs {
                if spec.name.is_empty() {
                    return Err(SignatureError::InvalidSignature {
                        signature: self.name.clone(),
                        detail: format!("{side} with an empty name"),
                    });
                }
                if !seen.insert(spec.name.as_str()) {
                    return Err(SignatureError::InvalidSignature {
                        signature: self.name.clone(),
                        detail: format!("duplicate {side} '{}'", spec.name),
                    });
                }
            }
        }
        if self.outputs.is_empty() {
            tracing::warn!("signature '{}' declares no outputs", self.name);
        }
        Ok(())
    }

    /// Returns a one-line description of the signature.
    pub fn summary(&self) -> String {
        let inputs: Vec<_> = self.inputs.iter().map(TensorSpec::summary).collect();
        let outputs: Vec<_> = self.outputs.iter().map(TensorSpec::summary).collect();
        format!(
            "{}({}) -> ({})",
            self.name,
            inputs.join(", "),
            outputs.join(", ")
        )
    }
}

impl fmt::Display for SignatureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::ElementKind;

    fn add_uint8() -> SignatureDef {
        SignatureDef::new("add_uint8")
            .with_input(TensorSpec::new("a", ElementKind::UInt8))
            .with_input(TensorSpec::new("b", ElementKind::UInt8))
            .with_output(TensorSpec::new("sum", ElementKind::UInt8))
    }

    #[test]
    fn test_lookup() {
        let sig = add_uint8();
        assert_eq!(sig.input("a").unwrap().kind, ElementKind::UInt8);
        assert!(sig.input("sum").is_none());
        assert!(sig.output("sum").is_some());
        assert_eq!(sig.input_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_validate_ok() {
        add_uint8().validate().unwrap();
    }

    #[test]
    fn test_validate_duplicate_input() {
        let sig = add_uint8().with_input(TensorSpec::new("a", ElementKind::Int32));
        match sig.validate() {
            Err(SignatureError::InvalidSignature { detail, .. }) => {
                assert!(detail.contains("duplicate input 'a'"))
            }
            other => panic!("expected invalid signature, got {other:?}"),
        }
    }

    #[test]
    fn test_input_and_output_may_share_name() {
        let sig = SignatureDef::new("identity")
            .with_input(TensorSpec::new("x", ElementKind::Float32))
            .with_output(TensorSpec::new("x", ElementKind::Float32));
        sig.validate().unwrap();
    }

    #[test]
    fn test_validate_empty_name() {
        assert!(SignatureDef::new("").validate().is_err());
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            add_uint8().summary(),
            "add_uint8(a: uint8, b: uint8) -> (sum: uint8)"
        );
    }
}
