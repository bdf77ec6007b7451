// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gate errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::license::{self, LicenseError};
use crate::licensing::LicenseStoreError;

/// Failure of any gate stage.
///
/// The credential variants are kept apart for logging, but all of them
/// render the same `401` body so a caller cannot tell a malformed token from
/// an expired or forged one.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential in cookie or header
    #[error("no credential presented")]
    MissingCredential,
    /// Signature does not verify or token is malformed
    #[error("credential is invalid")]
    InvalidCredential,
    /// Token is past its expiry
    #[error("credential has expired")]
    ExpiredCredential,
    /// Token carries no tenant, so entitlement cannot be checked
    #[error("credential carries no tenant scope")]
    MissingTenant,
    /// Role predicate failed
    #[error("access denied")]
    Forbidden,
    /// Tenant is not licensed for the module
    #[error(transparent)]
    License(#[from] LicenseError),
    /// Licensing state could not be read
    #[error("tenant licensing is unavailable")]
    LicensingUnavailable(#[source] LicenseStoreError),
    /// Handler expects a gate decision that no middleware made
    #[error("route is missing its gate middleware")]
    MissingGate,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Internal classification, for logs only.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidCredential => "invalid_credential",
            AuthError::ExpiredCredential => "expired_credential",
            AuthError::MissingTenant => "missing_tenant",
            AuthError::Forbidden => "forbidden",
            AuthError::License(_) => "module_not_licensed",
            AuthError::LicensingUnavailable(_) => "licensing_unavailable",
            AuthError::MissingGate => "missing_gate",
        }
    }

    /// Error code exposed to clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential
            | AuthError::ExpiredCredential
            | AuthError::MissingTenant => "unauthorized",
            AuthError::Forbidden => "forbidden",
            AuthError::License(_) => license::LICENSE_ERROR_CODE,
            AuthError::LicensingUnavailable(_) => "licensing_unavailable",
            AuthError::MissingGate => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential
            | AuthError::ExpiredCredential
            | AuthError::MissingTenant => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::License(_) => license::LICENSE_DENIED_STATUS,
            AuthError::LicensingUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::MissingGate => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error",
            _ => "Tenant licensing is temporarily unavailable",
        }
    }

}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Some(response) = license::license_response(&self) {
            return response;
        }

        tracing::debug!(kind = self.kind(), "rejecting request at gate");

        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code(),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
