// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Tenant Licensing
//!
//! Which modules each tenant has bought. The gate only ever reads this state
//! through [`LicenseStore`]; grants and revocations go through
//! [`LicenseAdmin`] and are reachable from super-admin endpoints only.
//!
//! Entitlement is binary: a module is either in a tenant's licensed set or
//! it is not. Tenants whose subscription is suspended or cancelled are
//! entitled to nothing, whatever their set contains.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod memory;
pub mod module;

pub use memory::InMemoryLicenseStore;
pub use module::{InvalidModuleId, ModuleId, ModuleKey};

/// Subscription lifecycle of a tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trial,
    Suspended,
    Cancelled,
}

impl SubscriptionStatus {
    /// Whether a tenant in this state can use its licensed modules.
    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }
}

/// Licensing record of one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TenantLicense {
    /// Tenant identifier
    pub tenant_id: String,
    /// Modules covered by the subscription
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub licensed_modules: BTreeSet<ModuleId>,
    /// Subscription status
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// Commercial tier (`free`, `starter`, `professional`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl TenantLicense {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            licensed_modules: BTreeSet::new(),
            status: SubscriptionStatus::Active,
            tier: None,
        }
    }

    pub fn with_module(mut self, module: ModuleId) -> Self {
        self.licensed_modules.insert(module);
        self
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// True when the tenant may use `module` right now.
    pub fn entitles(&self, module: &ModuleId) -> bool {
        self.status.grants_access() && self.licensed_modules.contains(module)
    }
}

/// Error type for licensing lookups.
#[derive(Debug, thiserror::Error)]
pub enum LicenseStoreError {
    #[error("failed to read licensing seed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid licensing seed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate licensing record for tenant {0}")]
    DuplicateTenant(String),
    #[error("licensing backend unavailable: {0}")]
    Backend(String),
}

/// Read access to tenant licensing state.
///
/// Implementations may be remote; the gate calls `tenant_license` at most
/// once per request and applies no timeout of its own.
#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Licensing record for `tenant_id`, or `None` if the tenant has none.
    async fn tenant_license(
        &self,
        tenant_id: &str,
    ) -> Result<Option<TenantLicense>, LicenseStoreError>;
}

/// Write access to tenant licensing state.
#[async_trait]
pub trait LicenseAdmin: LicenseStore {
    /// Add `module` to the tenant's licensed set, creating an active record
    /// if the tenant has none yet.
    async fn grant_module(
        &self,
        tenant_id: &str,
        module: ModuleId,
    ) -> Result<TenantLicense, LicenseStoreError>;

    /// Remove `module` from the tenant's licensed set.
    async fn revoke_module(
        &self,
        tenant_id: &str,
        module: &ModuleId,
    ) -> Result<Option<TenantLicense>, LicenseStoreError>;

    async fn set_status(
        &self,
        tenant_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<TenantLicense>, LicenseStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::module::{CRM, FINANCE};

    #[test]
    fn entitles_only_listed_modules() {
        let license = TenantLicense::new("t").with_module(CRM);
        assert!(license.entitles(&CRM));
        assert!(!license.entitles(&FINANCE));
    }

    #[test]
    fn suspended_tenant_is_entitled_to_nothing() {
        let license = TenantLicense::new("t")
            .with_module(CRM)
            .with_status(SubscriptionStatus::Suspended);
        assert!(!license.entitles(&CRM));
        assert!(SubscriptionStatus::Trial.grants_access());
        assert!(!SubscriptionStatus::Cancelled.grants_access());
    }

    #[test]
    fn deserializes_seed_record_with_defaults() {
        let license: TenantLicense =
            serde_json::from_str(r#"{"tenant_id":"t","licensed_modules":["crm","hr"]}"#).unwrap();
        assert_eq!(license.status, SubscriptionStatus::Active);
        assert_eq!(license.licensed_modules.len(), 2);
        assert!(license.tier.is_none());
    }
}
