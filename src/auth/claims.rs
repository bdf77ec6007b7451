// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the verified identity handed to route handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::roles::RoleSet;

/// Claims as they appear inside a signed token.
///
/// Access tokens issued by older login flows carry `userId` instead of `sub`
/// and a single `role` string instead of a `roles` array, so both shapes are
/// accepted. Licensing hints embedded in tokens (`licensedModules`,
/// `subscriptionTier`) are not modelled: entitlement is always
/// read from the licensing store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct WireClaims {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Legacy subject field
    #[serde(default, rename = "userId", skip_serializing)]
    pub user_id: Option<String>,
    /// Tenant the user belongs to
    #[serde(
        default,
        rename = "tenantId",
        alias = "tenant_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub tenant_id: Option<String>,
    /// Role names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Legacy single role
    #[serde(default, skip_serializing)]
    pub role: Option<String>,
    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Token ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Verified identity asserted by a credential.
///
/// Built once by the [`TokenVerifier`](super::TokenVerifier) and read-only
/// afterwards. There are no setters; the gate passes the same value through
/// every stage so tenant and user always come from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    user_id: String,
    tenant_id: Option<String>,
    roles: RoleSet,
    issued_at: i64,
    expires_at: i64,
}

impl Claims {
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: Option<String>,
        roles: RoleSet,
        issued_at: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.filter(|t| !t.trim().is_empty()),
            roles,
            issued_at,
            expires_at,
        }
    }

    /// Canonical user ID (`sub` claim).
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Tenant scope, if the token carries one.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Issued-at as a Unix timestamp.
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Expiry as a Unix timestamp.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    pub(crate) fn to_wire(&self) -> WireClaims {
        WireClaims {
            sub: Some(self.user_id.clone()),
            tenant_id: self.tenant_id.clone(),
            roles: self.roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: self.issued_at,
            exp: self.expires_at,
            ..WireClaims::default()
        }
    }
}

impl TryFrom<WireClaims> for Claims {
    type Error = AuthError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let user_id = wire
            .sub
            .or(wire.user_id)
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::InvalidCredential)?;

        let roles = RoleSet::from_raw(
            wire.roles
                .iter()
                .map(String::as_str)
                .chain(wire.role.as_deref()),
        );

        Ok(Claims::new(
            user_id,
            wire.tenant_id,
            roles,
            wire.iat,
            wire.exp,
        ))
    }
}
