// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! default_signature = "serving_default"
//! scalar_policy = "strict"
//! coerce_inputs = true
//! check_declared_shapes = true
//! enable_profiling = true
//! ```

use std::path::Path;

/// How [`crate::ResultView::as_scalar`] treats outputs that are not rank 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarPolicy {
    /// Only rank-0 outputs are scalars.
    #[default]
    Strict,
    /// Any output holding exactly one element is a scalar, whatever its rank.
    SingleElement,
}

/// Configuration for sessions and the requests they create.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Signature used when a request selects none. Overrides the backend's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_signature: Option<String>,
    /// Scalar extraction policy.
    #[serde(default)]
    pub scalar_policy: ScalarPolicy,
    /// Whether inputs are converted to the kind their signature declares.
    #[serde(default = "default_true")]
    pub coerce_inputs: bool,
    /// Whether inputs must match the signature's declared shapes.
    #[serde(default = "default_true")]
    pub check_declared_shapes: bool,
    /// Whether to collect per-request timing metrics.
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_signature: None,
            scalar_policy: ScalarPolicy::Strict,
            coerce_inputs: true,
            check_declared_shapes: true,
            enable_profiling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.default_signature, None);
        assert_eq!(c.scalar_policy, ScalarPolicy::Strict);
        assert!(c.coerce_inputs);
        assert!(c.check_declared_shapes);
        assert!(c.enable_profiling);
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
default_signature = "add_uint8"
scalar_policy = "single-element"
coerce_inputs = false
enable_profiling = false
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.default_signature.as_deref(), Some("add_uint8"));
        assert_eq!(c.scalar_policy, ScalarPolicy::SingleElement);
        assert!(!c.coerce_inputs);
        assert!(c.check_declared_shapes);
        assert!(!c.enable_profiling);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let c = RuntimeConfig::from_toml("").unwrap();
        assert_eq!(c.scalar_policy, ScalarPolicy::Strict);
        assert!(c.coerce_inputs);
    }

    #[test]
    fn test_unknown_policy() {
        let err = RuntimeConfig::from_toml(r#"scalar_policy = "lenient""#).unwrap_err();
        assert!(matches!(err, super::super::RuntimeError::ConfigError(_)));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            default_signature: Some("concat".into()),
            scalar_policy: ScalarPolicy::SingleElement,
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        assert!(toml.contains("single-element"));
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back.default_signature, c.default_signature);
        assert_eq!(back.scalar_policy, c.scalar_policy);

        let without_default = RuntimeConfig::default().to_toml().unwrap();
        assert!(!without_default.contains("default_signature"));
    }
}
