// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Module entitlement endpoints.
//!
//! `/v1/crm/*` declares its module with the [`RequireModule`] extractor,
//! `/v1/finance/*` with the `enforce_module` middleware on the subtree.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::license::{self, LicenseDeniedBody};
use crate::auth::{require_module_access, AuthError, Authenticated, Entitled, Entitlement, RequireModule};
use crate::error::ApiError;
use crate::licensing::module::Crm;
use crate::licensing::{InvalidModuleId, ModuleId};
use crate::state::AppState;

/// Granted access to one module.
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleAccessResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub module_id: String,
    pub licensed: bool,
}

impl From<Entitlement> for ModuleAccessResponse {
    fn from(entitlement: Entitlement) -> Self {
        Self {
            tenant_id: entitlement.tenant_id().to_string(),
            user_id: entitlement.user_id().to_string(),
            module_id: entitlement.module_id().to_string(),
            licensed: true,
        }
    }
}

/// Errors of the access probe.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error(transparent)]
    InvalidModule(#[from] InvalidModuleId),
    #[error("access denied")]
    Denied(#[source] AuthError),
}

impl From<AuthError> for AccessError {
    fn from(err: AuthError) -> Self {
        AccessError::Denied(err)
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        if let Some(response) = license::normalize(&self) {
            return response;
        }
        match self {
            AccessError::InvalidModule(e) => ApiError::from(e).into_response(),
            AccessError::Denied(e) => e.into_response(),
        }
    }
}

/// Check whether the caller's tenant may use a module.
#[utoipa::path(
    get,
    path = "/v1/modules/{module_id}/access",
    tag = "Modules",
    params(("module_id" = String, Path, description = "Module key, e.g. `crm`")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tenant is licensed", body = ModuleAccessResponse),
        (status = 400, description = "Malformed module id"),
        (status = 401, description = "Missing, invalid or expired credential, or no tenant scope"),
        (status = 402, description = "Tenant not licensed for the module", body = LicenseDeniedBody),
        (status = 503, description = "Licensing store unavailable"),
    )
)]
pub async fn check_access(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> Result<Json<ModuleAccessResponse>, AccessError> {
    let module = ModuleId::parse(&module_id)?;
    let entitlement = require_module_access(claims, &module, state.gate.licensing()).await?;
    Ok(Json(entitlement.into()))
}

/// Reachability probe of the CRM module.
#[utoipa::path(
    get,
    path = "/v1/crm/ping",
    tag = "Modules",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tenant is licensed for crm", body = ModuleAccessResponse),
        (status = 401, description = "Missing, invalid or expired credential, or no tenant scope"),
        (status = 402, description = "Tenant not licensed for crm", body = LicenseDeniedBody),
    )
)]
pub async fn crm_ping(access: RequireModule<Crm>) -> Json<ModuleAccessResponse> {
    Json(access.into_inner().into())
}

/// Reachability probe of the finance module.
#[utoipa::path(
    get,
    path = "/v1/finance/ping",
    tag = "Modules",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Tenant is licensed for finance", body = ModuleAccessResponse),
        (status = 401, description = "Missing, invalid or expired credential, or no tenant scope"),
        (status = 402, description = "Tenant not licensed for finance", body = LicenseDeniedBody),
    )
)]
pub async fn finance_ping(Entitled(access): Entitled) -> Json<ModuleAccessResponse> {
    Json(access.into())
}
