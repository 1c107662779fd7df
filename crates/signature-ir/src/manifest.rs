// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON signature manifest parsing.
//!
//! A manifest describes every signature a backend exposes. Kind names are
//! matched loosely (`"int32"`, `"i32"`, `"DT_INT32"` are equivalent).
//!
//! # Format
//! ```json
//! {
//!   "default_signature": "serving_default",
//!   "signatures": [
//!     {
//!       "name": "serving_default",
//!       "inputs":  [{ "name": "x", "kind": "float32", "shape": [null, 784] }],
//!       "outputs": [{ "name": "probabilities", "kind": "float32", "shape": [null, 10] }]
//!     }
//!   ]
//! }
//! ```

use crate::{DeclaredShape, SignatureDef, SignatureError, TensorSpec};
use std::path::Path;
use tensor_core::ElementKind;

/// Top-level signature manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SignatureManifest {
    /// Signature used when a request selects none. Falls back to the first
    /// listed signature when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_signature: Option<String>,
    /// Signature entries.
    pub signatures: Vec<ManifestSignature>,
}

/// A single signature entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestSignature {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ManifestTensor>,
    #[serde(default)]
    pub outputs: Vec<ManifestTensor>,
}

/// A single tensor entry in the manifest.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ManifestTensor {
    pub name: String,
    /// Kind string (e.g., `"uint8"`, `"string"`, `"DT_FLOAT"`).
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<Option<usize>>>,
}

impl SignatureManifest {
    /// Loads a manifest from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, SignatureError> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Self = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Serialises the manifest to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SignatureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a manifest describing existing signature definitions.
    pub fn from_signatures(signatures: &[SignatureDef], default_signature: Option<&str>) -> Self {
        let tensor = |spec: &TensorSpec| ManifestTensor {
            name: spec.name.clone(),
            kind: spec.kind.as_str().to_string(),
            shape: spec.shape.as_ref().map(|s| s.dims().to_vec()),
        };
        Self {
            default_signature: default_signature.map(str::to_string),
            signatures: signatures
                .iter()
                .map(|sig| ManifestSignature {
                    name: sig.name.clone(),
                    inputs: sig.inputs.iter().map(tensor).collect(),
                    outputs: sig.outputs.iter().map(tensor).collect(),
                })
                .collect(),
        }
    }

    /// Validates that the manifest is internally consistent.
    ///
    /// Checks:
    /// - At least one signature is defined.
    /// - Every kind string is recognised.
    /// - The default signature, if named, exists.
    ///
    /// Per-signature checks (duplicate tensor names) happen when the
    /// resulting [`crate::SignatureSet`] is validated.
    pub fn validate(&self) -> Result<(), SignatureError> {
        if self.signatures.is_empty() {
            return Err(SignatureError::InvalidSet(
                "manifest contains no signatures".into(),
            ));
        }

        for sig in &self.signatures {
            for tensor in sig.inputs.iter().chain(&sig.outputs) {
                parse_kind(&sig.name, tensor)?;
            }
        }

        if let Some(default) = &self.default_signature {
            if !self.signatures.iter().any(|s| &s.name == default) {
                return Err(SignatureError::InvalidSet(format!(
                    "default signature '{default}' is not declared"
                )));
            }
        }

        Ok(())
    }

    /// Converts the manifest entries into typed signature definitions.
    pub fn to_signatures(&self) -> Result<Vec<SignatureDef>, SignatureError> {
        self.signatures
            .iter()
            .map(|sig| {
                let convert = |tensors: &[ManifestTensor]| -> Result<Vec<TensorSpec>, SignatureError> {
                    tensors
                        .iter()
                        .map(|t| -> Result<TensorSpec, SignatureError> {
                            Ok(TensorSpec {
                                name: t.name.clone(),
                                kind: parse_kind(&sig.name, t)?,
                                shape: t.shape.clone().map(DeclaredShape::new),
                            })
                        })
                        .collect()
                };
                Ok(SignatureDef {
                    name: sig.name.clone(),
                    inputs: convert(&sig.inputs)?,
                    outputs: convert(&sig.outputs)?,
                })
            })
            .collect()
    }
}

fn parse_kind(signature: &str, tensor: &ManifestTensor) -> Result<ElementKind, SignatureError> {
    ElementKind::from_str_loose(&tensor.kind).ok_or_else(|| SignatureError::UnknownKind {
        signature: signature.to_string(),
        tensor: tensor.name.clone(),
        kind: tensor.kind.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest_json() -> &'static str {
        r#"{
            "default_signature": "concat",
            "signatures": [
                {
                    "name": "concat",
                    "inputs": [
                        { "name": "a", "kind": "string", "shape": [] },
                        { "name": "b", "kind": "string", "shape": [] }
                    ],
                    "outputs": [{ "name": "concat", "kind": "string", "shape": [] }]
                },
                {
                    "name": "add_int32",
                    "inputs": [
                        { "name": "x", "kind": "DT_INT32", "shape": [null] },
                        { "name": "y", "kind": "i32", "shape": [null] }
                    ],
                    "outputs": [{ "name": "sum", "kind": "int32" }]
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_manifest() {
        let m = SignatureManifest::from_json(sample_manifest_json()).unwrap();
        assert_eq!(m.default_signature.as_deref(), Some("concat"));
        assert_eq!(m.signatures.len(), 2);
        assert_eq!(m.signatures[1].inputs[0].shape, Some(vec![None]));
    }

    #[test]
    fn test_validate_ok() {
        SignatureManifest::from_json(sample_manifest_json())
            .unwrap()
            .validate()
            .unwrap();
    }

    #[test]
    fn test_to_signatures_parses_kind_aliases() {
        let sigs = SignatureManifest::from_json(sample_manifest_json())
            .unwrap()
            .to_signatures()
            .unwrap();
        let add = &sigs[1];
        assert_eq!(add.input("x").unwrap().kind, ElementKind::Int32);
        assert_eq!(add.input("y").unwrap().kind, ElementKind::Int32);
        assert_eq!(add.output("sum").unwrap().shape, None);
        assert_eq!(sigs[0].input("a").unwrap().kind, ElementKind::Text);
    }

    #[test]
    fn test_validate_empty() {
        let m = SignatureManifest::from_json(r#"{ "signatures": [] }"#).unwrap();
        assert!(matches!(m.validate(), Err(SignatureError::InvalidSet(_))));
    }

    #[test]
    fn test_validate_unknown_kind() {
        let json = r#"{
            "signatures": [
                { "name": "s", "inputs": [{ "name": "q", "kind": "complex64" }], "outputs": [] }
            ]
        }"#;
        let m = SignatureManifest::from_json(json).unwrap();
        match m.validate() {
            Err(SignatureError::UnknownKind { tensor, kind, .. }) => {
                assert_eq!(tensor, "q");
                assert_eq!(kind, "complex64");
            }
            other => panic!("expected unknown kind, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_missing_default() {
        let json = r#"{
            "default_signature": "nope",
            "signatures": [{ "name": "s", "outputs": [{ "name": "o", "kind": "bool" }] }]
        }"#;
        let m = SignatureManifest::from_json(json).unwrap();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SignatureManifest::from_json("{ not json"),
            Err(SignatureError::ManifestParseError(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let m = SignatureManifest::from_json(sample_manifest_json()).unwrap();
        let sigs = m.to_signatures().unwrap();
        let rebuilt = SignatureManifest::from_signatures(&sigs, Some("concat"));
        let back = SignatureManifest::from_json(&rebuilt.to_json().unwrap()).unwrap();
        assert_eq!(back.to_signatures().unwrap(), sigs);
        assert_eq!(back.default_signature.as_deref(), Some("concat"));
    }
}
