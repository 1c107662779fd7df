// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # signature-ir
//!
//! Declarations of what a computation backend accepts and produces.
//!
//! - [`TensorSpec`]: one named input or output, with its element kind and
//!   an optional [`DeclaredShape`] (unknown extents allowed).
//! - [`SignatureDef`]: one computation's inputs and outputs.
//! - [`SignatureSet`]: every signature of a backend, with a **type-state
//!   pattern** (`Loaded` → `Validated`) and a resolved default.
//! - [`SignatureManifest`]: the JSON descriptor a set is loaded from.
//!
//! # Example
//! ```no_run
//! use signature_ir::SignatureSet;
//! use std::path::Path;
//!
//! let set = SignatureSet::load(Path::new("./signatures.json")).unwrap();
//! println!("{set}");
//! println!("default: {}", set.default_name());
//! ```

mod error;
mod manifest;
pub mod set;
mod signature;
mod tensor_spec;

pub use error::SignatureError;
pub use manifest::{ManifestSignature, ManifestTensor, SignatureManifest};
pub use set::SignatureSet;
pub use signature::SignatureDef;
pub use tensor_spec::{DeclaredShape, TensorSpec};
