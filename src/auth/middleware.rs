// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate middleware for whole router subtrees.
//!
//! An alternative to per-handler extractors when every route of a subtree
//! belongs to the same module or needs the same role:
//!
//! ```rust,ignore
//! let finance = Router::new()
//!     .route("/finance/invoices", get(list_invoices))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         ModuleGuard::new(state.gate.clone(), FINANCE),
//!         enforce_module,
//!     ));
//! ```
//!
//! On success the verified [`Claims`] and the [`Entitlement`] are stored in
//! request extensions, where the extractors pick them up without running
//! the gate a second time.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::gate::{Entitlement, Gate, RolePredicate};
use super::Claims;
use crate::licensing::ModuleId;

/// Middleware state: the gate plus the requirement of the subtree.
#[derive(Clone)]
pub struct ModuleGuard {
    gate: Gate,
    module: ModuleId,
    predicate: RolePredicate,
}

impl ModuleGuard {
    pub fn new(gate: Gate, module: ModuleId) -> Self {
        Self {
            gate,
            module,
            predicate: RolePredicate::Any,
        }
    }

    /// Also require a role before the entitlement check.
    pub fn with_role(mut self, predicate: RolePredicate) -> Self {
        self.predicate = predicate;
        self
    }
}

/// Reject requests whose tenant is not licensed for the guard's module.
pub async fn enforce_module(
    State(guard): State<ModuleGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    let result = guard
        .gate
        .admit_with_role(request.headers(), guard.predicate, &guard.module)
        .await;

    match result {
        Ok(entitlement) => {
            request.extensions_mut().insert(entitlement.claims().clone());
            request.extensions_mut().insert::<Entitlement>(entitlement);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware state for role-only subtrees.
#[derive(Clone)]
pub struct RoleGuard {
    gate: Gate,
    predicate: RolePredicate,
}

impl RoleGuard {
    pub fn new(gate: Gate, predicate: RolePredicate) -> Self {
        Self { gate, predicate }
    }
}

/// Reject requests that fail the guard's role predicate.
pub async fn enforce_role(
    State(guard): State<RoleGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    match guard.gate.authorize(request.headers(), guard.predicate) {
        Ok(claims) => {
            request.extensions_mut().insert::<Claims>(claims);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
