// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! License denial and its client-facing shape.
//!
//! A license denial means the caller is who they claim to be and holds the
//! right role, but their tenant's subscription does not cover the module.
//! Clients render an upgrade prompt for it rather than a login redirect, so
//! it gets its own status and body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::AuthError;
use crate::licensing::ModuleId;

/// Status used for every license denial.
pub const LICENSE_DENIED_STATUS: StatusCode = StatusCode::PAYMENT_REQUIRED;

/// Error code used for every license denial.
pub const LICENSE_ERROR_CODE: &str = "module_not_licensed";

/// Entitlement failure for one module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("module `{module_id}` is not licensed for this tenant")]
pub struct LicenseError {
    module_id: ModuleId,
}

impl LicenseError {
    pub fn new(module_id: ModuleId) -> Self {
        Self { module_id }
    }

    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    fn to_response(&self) -> Response {
        let body = Json(LicenseDeniedBody {
            error: "Module not licensed".to_string(),
            error_code: LICENSE_ERROR_CODE.to_string(),
            module_id: self.module_id.to_string(),
        });
        (LICENSE_DENIED_STATUS, body).into_response()
    }
}

impl IntoResponse for LicenseError {
    fn into_response(self) -> Response {
        self.to_response()
    }
}

/// Body of a license denial response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LicenseDeniedBody {
    /// Human readable summary
    pub error: String,
    /// Always `module_not_licensed`
    pub error_code: String,
    /// Module the tenant is missing
    pub module_id: String,
}

/// Build the license response for a gate error, or `None` when the error is
/// some other kind and the caller should keep handling it.
pub fn license_response(err: &AuthError) -> Option<Response> {
    match err {
        AuthError::License(license) => Some(license.to_response()),
        _ => None,
    }
}

/// Same as [`license_response`] for an arbitrary error.
///
/// Walks the `source()` chain so a license denial wrapped by a handler's own
/// error type is still recognised.
pub fn normalize(err: &(dyn std::error::Error + 'static)) -> Option<Response> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(license) = e.downcast_ref::<LicenseError>() {
            return Some(license.to_response());
        }
        if let Some(auth) = e.downcast_ref::<AuthError>() {
            if let Some(response) = license_response(auth) {
                return Some(response);
            }
        }
        current = e.source();
    }
    None
}
