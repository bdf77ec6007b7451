// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Gate, TokenVerifier};
use crate::licensing::LicenseAdmin;

/// Per-process state handed to every handler.
///
/// The gate only sees the licensing store through its read-only trait;
/// `licenses` is the write side used by the super-admin endpoints.
#[derive(Clone)]
pub struct AppState {
    pub gate: Gate,
    pub licenses: Arc<dyn LicenseAdmin>,
}

impl AppState {
    pub fn new<S>(verifier: TokenVerifier, store: Arc<S>) -> Self
    where
        S: LicenseAdmin + 'static,
    {
        Self {
            gate: Gate::new(verifier, store.clone()),
            licenses: store,
        }
    }

    /// Use a different session cookie name.
    pub fn with_cookie_name(mut self, name: impl AsRef<str>) -> Self {
        self.gate = self.gate.with_cookie_name(name);
        self
    }
}
