// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The request protocol between callers and a computation backend.
//!
//! A [`Session`] owns a [`Backend`] handle and a [`RuntimeConfig`]. Each call
//! goes through a single-use [`RequestBuilder`]:
//!
//! ```text
//! session.request()
//!     .bind_input(..) / .bind_buffer(..) / .request_output(..) / .select_signature(..)
//!     .submit()  → ExecutionResult
//!     .output(name) → ResultView → as_scalar / as_array / as_multidimensional / as_flat
//! ```
//!
//! On submit, every bound name is checked against the backend's declared
//! signature before anything is marshalled, and inputs are converted to the
//! declared element kinds. Backend failures are passed through unchanged.
//!
//! # Threading
//! Sessions are `Sync` when their backend is; builders take `&mut self`
//! and therefore stay confined to one task. The only blocking operation is
//! the backend call inside [`RequestBuilder::submit`].

mod backend;
mod config;
mod error;
mod metrics;
mod request;
mod result;
mod session;

pub use backend::{Backend, BackendError, FnBackend, SharedBackendError, TensorMap};
pub use config::{RuntimeConfig, ScalarPolicy};
pub use error::{Direction, RuntimeError};
pub use metrics::RequestMetrics;
pub use request::{Binding, RequestBuilder, RequestState};
pub use result::{ExecutionResult, ResultView};
pub use session::Session;
