// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tenant Gate - authorization and module licensing for the business suite
//!
//! Every protected route verifies the caller's credential, applies the
//! route's role requirement and checks that the caller's tenant is licensed
//! for the route's module.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential extraction, JWT verification, role and module gates
//! - `licensing` - Module catalog and tenant licensing store
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod licensing;
pub mod state;
pub mod telemetry;
