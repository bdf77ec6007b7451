// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Gate
//!
//! Tenant-scoped authentication, role checks and module entitlement for the
//! business suite API.
//!
//! ## Request Flow
//!
//! 1. Credential is read from `Authorization: Bearer <token>` or the
//!    session cookie (`token` by default)
//! 2. The JWT signature and expiry are verified against the configured key
//!    and decoded into immutable [`Claims`]:
//!      - `sub` → user id
//!      - `tenantId` → tenant scope
//!      - `roles` → closed [`Role`] set
//! 3. The route's role predicate is applied (tenant-admin, super-admin, any)
//! 4. The tenant's licensing record is read once and the route's module must
//!    be in its licensed set
//!
//! ## Responses
//!
//! - `401` for a missing, malformed, forged or expired credential (one
//!   body for all of them)
//! - `403` when the role predicate fails (the required role is not named)
//! - `402` with `module_id` when the tenant is not licensed for the module

pub mod claims;
pub mod credential;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod license;
pub mod middleware;
pub mod roles;
pub mod verifier;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::{Authenticated, Entitled, OptionalAuth, RequireModule, SuperAdmin, TenantAdmin};
pub use gate::{require_module_access, require_role, Entitlement, Gate, RolePredicate};
pub use license::LicenseError;
pub use roles::{Role, RoleSet};
pub use verifier::{TokenIssuer, TokenVerifier};
