// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported element kinds.

use std::fmt;

/// Enumerates the primitive value categories an array or buffer can hold.
///
/// Every container holds exactly one `ElementKind`. The serialised names
/// (`"bool"`, `"int8"`, `"uint8"`, `"int32"`, `"int64"`, `"float32"`,
/// `"float64"`, `"text"`) are the ones used by signature manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Boolean, stored as one byte (0 or 1) on the wire.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 8-bit unsigned integer. Widening zero-extends (0..=255).
    UInt8,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit IEEE 754 floating point.
    Float32,
    /// 64-bit IEEE 754 floating point.
    Float64,
    /// UTF-8 text, stored as a variable-length byte sequence per element.
    Text,
}

impl ElementKind {
    /// Every kind, in declaration order.
    pub const ALL: [ElementKind; 8] = [
        ElementKind::Bool,
        ElementKind::Int8,
        ElementKind::UInt8,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::Text,
    ];

    /// Returns the fixed width of one element in bytes, or `None` for
    /// variable-width [`ElementKind::Text`].
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            ElementKind::Bool | ElementKind::Int8 | ElementKind::UInt8 => Some(1),
            ElementKind::Int32 | ElementKind::Float32 => Some(4),
            ElementKind::Int64 | ElementKind::Float64 => Some(8),
            ElementKind::Text => None,
        }
    }

    /// Returns a human-readable label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Bool => "bool",
            ElementKind::Int8 => "int8",
            ElementKind::UInt8 => "uint8",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Text => "text",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ElementKind::Int8 | ElementKind::UInt8 | ElementKind::Int32 | ElementKind::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementKind::Float32 | ElementKind::Float64)
    }

    /// Parses a kind name, accepting common aliases (`"i32"`, `"float"`,
    /// `"string"`, `"DT_INT32"`, ...). Case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let name = lower.strip_prefix("dt_").unwrap_or(&lower);
        match name {
            "bool" | "boolean" => Some(ElementKind::Bool),
            "int8" | "i8" => Some(ElementKind::Int8),
            "uint8" | "u8" | "byte" => Some(ElementKind::UInt8),
            "int32" | "i32" | "int" => Some(ElementKind::Int32),
            "int64" | "i64" | "long" => Some(ElementKind::Int64),
            "float32" | "f32" | "float" => Some(ElementKind::Float32),
            "float64" | "f64" | "double" => Some(ElementKind::Float64),
            "text" | "string" | "str" => Some(ElementKind::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
