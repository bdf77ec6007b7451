// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller identity and module catalog.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Authenticated, Claims, OptionalAuth, Role};
use crate::error::ApiError;
use crate::licensing::module::CATALOG;
use crate::state::AppState;

/// Response for GET /v1/session
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    /// Tenant scope of the credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Recognized roles; unknown role strings are not listed
    pub roles: Vec<Role>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Claims> for SessionResponse {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id().to_string(),
            tenant_id: claims.tenant_id().map(str::to_string),
            roles: claims.roles().iter().collect(),
            expires_at: claims.expires_at_utc(),
        }
    }
}

/// Get the verified identity of the caller.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller identity", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired credential"),
    )
)]
pub async fn get_session(Authenticated(claims): Authenticated) -> Json<SessionResponse> {
    Json(claims.into())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub module_id: String,
    /// Whether the caller's tenant is licensed; absent for anonymous callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licensed: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub modules: Vec<CatalogEntry>,
}

/// List the module catalog.
///
/// Public. Signed-in callers with a tenant scope also see which modules
/// their tenant is licensed for.
#[utoipa::path(
    get,
    path = "/v1/modules",
    tag = "Session",
    responses(
        (status = 200, description = "Module catalog", body = CatalogResponse),
        (status = 503, description = "Licensing store unavailable"),
    )
)]
pub async fn list_modules(
    OptionalAuth(claims): OptionalAuth,
    State(state): State<AppState>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let license = match claims.as_ref().and_then(Claims::tenant_id) {
        Some(tenant_id) => Some(state.gate.licensing().tenant_license(tenant_id).await?),
        None => None,
    };

    let modules = CATALOG
        .iter()
        .map(|module| CatalogEntry {
            module_id: module.to_string(),
            licensed: license
                .as_ref()
                .map(|record| record.as_ref().is_some_and(|l| l.entitles(module))),
        })
        .collect();

    Ok(Json(CatalogResponse { modules }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RoleSet, TokenVerifier};
    use crate::licensing::module::{CRM, HR};
    use crate::licensing::{InMemoryLicenseStore, TenantLicense};
    use std::sync::Arc;

    fn claims(tenant: Option<&str>) -> Claims {
        Claims::new(
            "user_1",
            tenant.map(str::to_string),
            RoleSet::from_raw(["owner", "astronaut"]),
            1_700_000_000,
            1_700_003_600,
        )
    }

    async fn state() -> AppState {
        let store = Arc::new(InMemoryLicenseStore::new());
        store
            .upsert(TenantLicense::new("tenant_a").with_module(CRM).with_module(HR))
            .await;
        AppState::new(TokenVerifier::hs256(b"session"), store)
    }

    #[test]
    fn session_response_lists_known_roles_only() {
        let response = SessionResponse::from(claims(Some("tenant_a")));
        assert_eq!(response.user_id, "user_1");
        assert_eq!(response.tenant_id.as_deref(), Some("tenant_a"));
        assert_eq!(response.roles, vec![Role::Owner]);
        assert_eq!(
            response.expires_at.map(|t| t.timestamp()),
            Some(1_700_003_600)
        );
    }

    #[tokio::test]
    async fn anonymous_catalog_has_no_license_flags() {
        let Json(catalog) = list_modules(OptionalAuth(None), State(state().await))
            .await
            .unwrap();
        assert_eq!(catalog.modules.len(), CATALOG.len());
        assert!(catalog.modules.iter().all(|m| m.licensed.is_none()));
    }

    #[tokio::test]
    async fn tenant_catalog_marks_licensed_modules() {
        let Json(catalog) = list_modules(
            OptionalAuth(Some(claims(Some("tenant_a")))),
            State(state().await),
        )
        .await
        .unwrap();
        let licensed: Vec<_> = catalog
            .modules
            .iter()
            .filter(|m| m.licensed == Some(true))
            .map(|m| m.module_id.as_str())
            .collect();
        assert_eq!(licensed, vec!["crm", "hr"]);
    }

    #[tokio::test]
    async fn unknown_tenant_sees_nothing_licensed() {
        let Json(catalog) = list_modules(
            OptionalAuth(Some(claims(Some("tenant_z")))),
            State(state().await),
        )
        .await
        .unwrap();
        assert!(catalog.modules.iter().all(|m| m.licensed == Some(false)));
    }
}
