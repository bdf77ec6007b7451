// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authorization gate.
//!
//! ```text
//! extract credential -> verify -> role predicate -> module entitlement
//! ```
//!
//! Every stage short-circuits on failure. Nothing is cached between
//! requests: each call runs the chain fresh from the request headers.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::claims::Claims;
use super::credential::{extract_credential, DEFAULT_COOKIE_NAME};
use super::error::AuthError;
use super::license::LicenseError;
use super::roles::{SUPER_ADMIN_ROLES, TENANT_ADMIN_ROLES};
use super::verifier::TokenVerifier;
use crate::licensing::{LicenseStore, ModuleId};

/// Role requirement declared by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePredicate {
    /// Any authenticated caller
    Any,
    /// Tenant owner or admin, with a tenant scope
    TenantAdmin,
    /// Platform super-admin, tenant independent
    SuperAdmin,
}

impl RolePredicate {
    pub fn is_satisfied_by(&self, claims: &Claims) -> bool {
        match self {
            RolePredicate::Any => true,
            RolePredicate::TenantAdmin => {
                claims.tenant_id().is_some() && claims.roles().intersects(TENANT_ADMIN_ROLES)
            }
            RolePredicate::SuperAdmin => claims.roles().intersects(SUPER_ADMIN_ROLES),
        }
    }
}

/// Successful entitlement check.
///
/// Tenant and user are taken from the same [`Claims`] value that passed the
/// check. Handlers must scope their data access with `tenant_id()` from here,
/// not with a tenant id found in the request body or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
    tenant_id: String,
    user_id: String,
    module_id: ModuleId,
    claims: Claims,
}

impl Entitlement {
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

/// Check `claims` against a role predicate.
///
/// Returns the claims unchanged on success.
pub fn require_role(claims: Claims, predicate: RolePredicate) -> Result<Claims, AuthError> {
    if predicate.is_satisfied_by(&claims) {
        Ok(claims)
    } else {
        tracing::warn!(
            user_id = claims.user_id(),
            tenant_id = claims.tenant_id(),
            predicate = ?predicate,
            "role predicate failed"
        );
        Err(AuthError::Forbidden)
    }
}

/// Check that the caller's tenant is licensed for `module`.
///
/// Performs exactly one licensing lookup. Claims without a tenant scope fail
/// closed with `MissingTenant` before the store is consulted.
pub async fn require_module_access(
    claims: Claims,
    module: &ModuleId,
    licensing: &dyn LicenseStore,
) -> Result<Entitlement, AuthError> {
    let Some(tenant_id) = claims.tenant_id().map(str::to_string) else {
        tracing::warn!(
            user_id = claims.user_id(),
            module_id = %module,
            "credential has no tenant scope"
        );
        return Err(AuthError::MissingTenant);
    };

    let license = licensing.tenant_license(&tenant_id).await.map_err(|e| {
        tracing::error!(tenant_id = %tenant_id, error = %e, "licensing lookup failed");
        AuthError::LicensingUnavailable(e)
    })?;

    let entitled = license.is_some_and(|license| license.entitles(module));
    if !entitled {
        tracing::warn!(
            tenant_id = %tenant_id,
            user_id = claims.user_id(),
            module_id = %module,
            "module not licensed for tenant"
        );
        return Err(LicenseError::new(module.clone()).into());
    }

    Ok(Entitlement {
        user_id: claims.user_id().to_string(),
        tenant_id,
        module_id: module.clone(),
        claims,
    })
}

/// Gate configuration shared by all requests.
///
/// Cloning is cheap; the verifier and licensing store are shared.
#[derive(Clone)]
pub struct Gate {
    verifier: Arc<TokenVerifier>,
    licensing: Arc<dyn LicenseStore>,
    cookie_name: Arc<str>,
}

impl Gate {
    pub fn new(verifier: TokenVerifier, licensing: Arc<dyn LicenseStore>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            licensing,
            cookie_name: Arc::from(DEFAULT_COOKIE_NAME),
        }
    }

    /// Use a different session cookie name.
    pub fn with_cookie_name(mut self, name: impl AsRef<str>) -> Self {
        self.cookie_name = Arc::from(name.as_ref());
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn licensing(&self) -> &dyn LicenseStore {
        self.licensing.as_ref()
    }

    /// Extract and verify the request's credential.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let credential =
            extract_credential(headers, &self.cookie_name).ok_or(AuthError::MissingCredential)?;

        self.verifier.verify(credential.token()).inspect_err(|e| {
            tracing::debug!(
                kind = e.kind(),
                source = ?credential.source(),
                "credential rejected"
            );
        })
    }

    /// Authenticate, then apply a role predicate.
    pub fn authorize(
        &self,
        headers: &HeaderMap,
        predicate: RolePredicate,
    ) -> Result<Claims, AuthError> {
        require_role(self.authenticate(headers)?, predicate)
    }

    /// Authenticate, then check the tenant's entitlement to `module`.
    pub async fn admit(
        &self,
        headers: &HeaderMap,
        module: &ModuleId,
    ) -> Result<Entitlement, AuthError> {
        let claims = self.authenticate(headers)?;
        require_module_access(claims, module, self.licensing()).await
    }

    /// Full pipeline: authenticate, role predicate, then entitlement.
    pub async fn admit_with_role(
        &self,
        headers: &HeaderMap,
        predicate: RolePredicate,
        module: &ModuleId,
    ) -> Result<Entitlement, AuthError> {
        let claims = self.authorize(headers, predicate)?;
        require_module_access(claims, module, self.licensing()).await
    }
}
