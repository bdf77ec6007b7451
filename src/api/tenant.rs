// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::auth::TenantAdmin;
use crate::error::ApiError;
use crate::licensing::{LicenseStore, TenantLicense};
use crate::state::AppState;

/// Licensing record of the caller's own tenant.
///
/// The tenant comes from the verified credential only.
#[utoipa::path(
    get,
    path = "/v1/tenant/license",
    tag = "Tenant",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tenant licensing record", body = TenantLicense),
        (status = 401, description = "Missing, invalid or expired credential"),
        (status = 403, description = "Tenant owner or admin required"),
        (status = 404, description = "Tenant has no licensing record"),
        (status = 503, description = "Licensing store unavailable"),
    )
)]
pub async fn get_tenant_license(
    TenantAdmin(claims): TenantAdmin,
    State(state): State<AppState>,
) -> Result<Json<TenantLicense>, ApiError> {
    // TenantAdmin guarantees a tenant scope
    let tenant_id = claims
        .tenant_id()
        .ok_or_else(|| ApiError::not_found("Tenant has no licensing record"))?;

    state
        .licenses
        .tenant_license(tenant_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Tenant has no licensing record"))
}
