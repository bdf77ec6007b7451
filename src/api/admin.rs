// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Super-admin licensing administration.
//!
//! These endpoints require the SuperAdmin role and provide:
//! - Licensing record lookup for any tenant
//! - Module grant and revocation
//! - Subscription status changes
//!
//! Mutations go to the licensing store; the gate reads the new state on the
//! next request.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    auth::SuperAdmin,
    error::ApiError,
    licensing::{LicenseStore, ModuleId, SubscriptionStatus, TenantLicense},
    state::AppState,
};

/// Request to change a tenant's subscription status.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: SubscriptionStatus,
}

fn no_record(tenant_id: &str) -> ApiError {
    ApiError::not_found(format!("Tenant {tenant_id} has no licensing record"))
}

/// Licensing record of any tenant.
#[utoipa::path(
    get,
    path = "/v1/admin/tenants/{tenant_id}/license",
    tag = "Admin",
    params(("tenant_id" = String, Path, description = "Tenant identifier")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tenant licensing record", body = TenantLicense),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (super-admin required)"),
        (status = 404, description = "Tenant has no licensing record")
    )
)]
pub async fn get_license(
    SuperAdmin(_admin): SuperAdmin,
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<TenantLicense>, ApiError> {
    state
        .licenses
        .tenant_license(&tenant_id)
        .await?
        .map(Json)
        .ok_or_else(|| no_record(&tenant_id))
}

/// License a module for a tenant.
///
/// Creates an active record when the tenant has none. Only catalog modules
/// can be granted.
#[utoipa::path(
    put,
    path = "/v1/admin/tenants/{tenant_id}/modules/{module_id}",
    tag = "Admin",
    params(
        ("tenant_id" = String, Path, description = "Tenant identifier"),
        ("module_id" = String, Path, description = "Module key")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated licensing record", body = TenantLicense),
        (status = 400, description = "Malformed or unknown module id"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (super-admin required)")
    )
)]
pub async fn grant_module(
    SuperAdmin(admin): SuperAdmin,
    State(state): State<AppState>,
    Path((tenant_id, module_id)): Path<(String, String)>,
) -> Result<Json<TenantLicense>, ApiError> {
    let module = ModuleId::parse(&module_id)?;
    if !module.is_known() {
        return Err(ApiError::bad_request(format!("Unknown module {module}")));
    }

    let license = state.licenses.grant_module(&tenant_id, module.clone()).await?;
    tracing::info!(
        admin_id = %admin.user_id(),
        tenant_id = %tenant_id,
        module_id = %module,
        "Module granted"
    );
    Ok(Json(license))
}

/// Remove a module from a tenant's licensed set.
#[utoipa::path(
    delete,
    path = "/v1/admin/tenants/{tenant_id}/modules/{module_id}",
    tag = "Admin",
    params(
        ("tenant_id" = String, Path, description = "Tenant identifier"),
        ("module_id" = String, Path, description = "Module key")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated licensing record", body = TenantLicense),
        (status = 400, description = "Malformed module id"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (super-admin required)"),
        (status = 404, description = "Tenant has no licensing record")
    )
)]
pub async fn revoke_module(
    SuperAdmin(admin): SuperAdmin,
    State(state): State<AppState>,
    Path((tenant_id, module_id)): Path<(String, String)>,
) -> Result<Json<TenantLicense>, ApiError> {
    let module = ModuleId::parse(&module_id)?;
    let license = state
        .licenses
        .revoke_module(&tenant_id, &module)
        .await?
        .ok_or_else(|| no_record(&tenant_id))?;

    tracing::info!(
        admin_id = %admin.user_id(),
        tenant_id = %tenant_id,
        module_id = %module,
        "Module revoked"
    );
    Ok(Json(license))
}

/// Change a tenant's subscription status.
///
/// Suspended and cancelled tenants keep their licensed set but are entitled
/// to nothing until reactivated.
#[utoipa::path(
    put,
    path = "/v1/admin/tenants/{tenant_id}/status",
    tag = "Admin",
    params(("tenant_id" = String, Path, description = "Tenant identifier")),
    request_body = UpdateStatusRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated licensing record", body = TenantLicense),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (super-admin required)"),
        (status = 404, description = "Tenant has no licensing record")
    )
)]
pub async fn set_status(
    SuperAdmin(admin): SuperAdmin,
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<TenantLicense>, ApiError> {
    let license = state
        .licenses
        .set_status(&tenant_id, request.status)
        .await?
        .ok_or_else(|| no_record(&tenant_id))?;

    tracing::info!(
        admin_id = %admin.user_id(),
        tenant_id = %tenant_id,
        status = ?request.status,
        "Subscription status changed"
    );
    Ok(Json(license))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, RoleSet, TokenVerifier};
    use crate::licensing::module::{CRM, FINANCE};
    use crate::licensing::InMemoryLicenseStore;
    use axum::http::StatusCode;
    use std::sync::Arc;

    fn super_admin() -> SuperAdmin {
        SuperAdmin(Claims::new(
            "root",
            None,
            RoleSet::from_raw(["SUPER_ADMIN"]),
            0,
            i64::MAX,
        ))
    }

    async fn state() -> AppState {
        let store = Arc::new(InMemoryLicenseStore::new());
        store
            .upsert(TenantLicense::new("tenant_a").with_module(CRM))
            .await;
        AppState::new(TokenVerifier::hs256(b"admin"), store)
    }

    fn path(tenant: &str, module: &str) -> Path<(String, String)> {
        Path((tenant.to_string(), module.to_string()))
    }

    #[tokio::test]
    async fn get_license_for_any_tenant() {
        let state = state().await;
        let Json(license) = get_license(super_admin(), State(state.clone()), Path("tenant_a".into()))
            .await
            .unwrap();
        assert_eq!(license.tenant_id, "tenant_a");

        let err = get_license(super_admin(), State(state), Path("tenant_b".into()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn grant_creates_record_for_new_tenant() {
        let state = state().await;
        let Json(license) = grant_module(super_admin(), State(state.clone()), path("tenant_b", "finance"))
            .await
            .unwrap();
        assert_eq!(license.tenant_id, "tenant_b");
        assert!(license.entitles(&FINANCE));
    }

    #[tokio::test]
    async fn grant_rejects_unknown_and_malformed_modules() {
        let state = state().await;
        let err = grant_module(super_admin(), State(state.clone()), path("tenant_a", "payroll"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = grant_module(super_admin(), State(state), path("tenant_a", "CRM"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn revoke_removes_module() {
        let state = state().await;
        let Json(license) = revoke_module(super_admin(), State(state.clone()), path("tenant_a", "crm"))
            .await
            .unwrap();
        assert!(!license.entitles(&CRM));

        let err = revoke_module(super_admin(), State(state), path("tenant_b", "crm"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn suspension_removes_entitlement() {
        let state = state().await;
        let Json(license) = set_status(
            super_admin(),
            State(state),
            Path("tenant_a".into()),
            Json(UpdateStatusRequest {
                status: SubscriptionStatus::Suspended,
            }),
        )
        .await
        .unwrap();
        assert!(license.licensed_modules.contains(&CRM));
        assert!(!license.entitles(&CRM));
    }
}
