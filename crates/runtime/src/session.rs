// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sessions: a backend handle plus the configuration its requests use.

use crate::{Backend, RequestBuilder, RuntimeConfig, RuntimeError};

/// An explicitly owned backend handle from which requests are created.
///
/// A session holds no per-request state and may be shared across threads
/// (it is `Sync` whenever the backend is); each [`RequestBuilder`] borrows
/// it for the duration of one request.
pub struct Session<B: Backend> {
    backend: B,
    config: RuntimeConfig,
}

impl<B: Backend> Session<B> {
    /// Creates a session with the default configuration.
    pub fn new(backend: B) -> Self {
        tracing::info!(
            "session created (backend default signature: {:?})",
            backend.default_signature()
        );
        Self {
            backend,
            config: RuntimeConfig::default(),
        }
    }

    /// Creates a session with the given configuration.
    ///
    /// Fails if the configured default signature is not declared by the backend.
    pub fn with_config(backend: B, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        if let Some(name) = &config.default_signature {
            if backend.signature(name).is_none() {
                return Err(RuntimeError::ConfigError(format!(
                    "default signature '{name}' is not declared by the backend"
                )));
            }
        }
        tracing::info!(
            "session created (default signature: {:?}, scalar policy: {:?})",
            config
                .default_signature
                .as_deref()
                .or_else(|| backend.default_signature()),
            config.scalar_policy
        );
        Ok(Self { backend, config })
    }

    /// Starts a new request.
    pub fn request(&self) -> RequestBuilder<'_, B> {
        RequestBuilder::new(self)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl<B: Backend> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &std::any::type_name::<B>())
            .field("config", &self.config)
            .finish()
    }
}
