// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Array values and the flat buffers a computation backend exchanges.
//!
//! This crate provides:
//! - [`ElementKind`]: the closed set of element kinds (bool, 8/32/64-bit integers, floats, text).
//! - [`Shape`]: dimension extents, rank 0 for scalars.
//! - [`NestedArray`]: recursive in-memory arrays, and [`FlatBuffer`]: contiguous shape-tagged buffers.
//! - [`introspect`]: shape and kind discovery with full regularity checks.
//! - [`coerce`]: the pairwise conversion rules between element kinds.
//! - [`marshal`]: row-major conversion between nested arrays and flat buffers.
//!
//! # Design Goals
//! - One generic traversal over [`NestedArray`]; kind-specific behaviour lives only in [`coerce`].
//! - No shared mutable state: every function is safe to call from any thread.
//! - Clean error types via `thiserror`.

mod buffer;
pub mod coerce;
mod error;
pub mod introspect;
mod kind;
pub mod marshal;
mod nested;
mod scalar;
mod shape;

pub use buffer::{BufferData, FlatBuffer};
pub use error::TensorError;
pub use kind::ElementKind;
pub use nested::{Leaves, NestedArray, NestedBytes};
pub use scalar::{Element, Scalar};
pub use shape::Shape;
