// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the gate.
//!
//! Each protected handler declares exactly one requirement through its
//! extractor:
//!
//! ```rust,ignore
//! async fn list_deals(RequireModule(access, _): RequireModule<Crm>) -> impl IntoResponse {
//!     // access.tenant_id() scopes every query
//! }
//!
//! async fn broadcast(SuperAdmin(claims): SuperAdmin) -> impl IntoResponse { /* ... */ }
//! ```
//!
//! A rejection is an [`AuthError`], which renders the normalized response.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::gate::{require_role, Entitlement, RolePredicate};
use super::{AuthError, Claims};
use crate::licensing::ModuleKey;
use crate::state::AppState;

/// Any authenticated caller.
pub struct Authenticated(pub Claims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Middleware may already have verified this request
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(Authenticated(claims));
        }

        state.gate.authenticate(&parts.headers).map(Authenticated)
    }
}

/// Extractor that requires a tenant owner or admin.
pub struct TenantAdmin(pub Claims);

impl FromRequestParts<AppState> for TenantAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;
        require_role(claims, RolePredicate::TenantAdmin).map(TenantAdmin)
    }
}

/// Extractor that requires a platform super-admin.
pub struct SuperAdmin(pub Claims);

impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(claims) = Authenticated::from_request_parts(parts, state).await?;
        require_role(claims, RolePredicate::SuperAdmin).map(SuperAdmin)
    }
}

/// Extractor that requires the caller's tenant to be licensed for `M`.
pub struct RequireModule<M: ModuleKey>(pub Entitlement, pub PhantomData<fn() -> M>);

impl<M: ModuleKey> RequireModule<M> {
    pub fn into_inner(self) -> Entitlement {
        self.0
    }
}

impl<M: ModuleKey> FromRequestParts<AppState> for RequireModule<M> {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let module = M::MODULE;

        // Reuse the middleware's decision for the same module
        if let Some(entitlement) = parts.extensions.get::<Entitlement>() {
            if entitlement.module_id() == &module {
                return Ok(RequireModule(entitlement.clone(), PhantomData));
            }
        }

        let entitlement = state.gate.admit(&parts.headers, &module).await?;
        Ok(RequireModule(entitlement, PhantomData))
    }
}

/// Entitlement established by [`enforce_module`](super::middleware::enforce_module).
///
/// Fails closed with a server error when a handler using it is mounted
/// without the middleware.
pub struct Entitled(pub Entitlement);

impl<S: Send + Sync> FromRequestParts<S> for Entitled {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Entitlement>().cloned() {
            Some(entitlement) => Ok(Entitled(entitlement)),
            None => {
                tracing::error!(
                    path = parts.uri.path(),
                    "Entitled extractor used on a route without module middleware"
                );
                Err(AuthError::MissingGate)
            }
        }
    }
}

/// Optional authentication extractor.
///
/// Returns `None` instead of rejecting, for public endpoints that show more
/// to signed-in callers.
pub struct OptionalAuth(pub Option<Claims>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Authenticated::from_request_parts(parts, state).await {
            Ok(Authenticated(claims)) => Ok(OptionalAuth(Some(claims))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
