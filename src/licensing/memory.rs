// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process licensing store.
//!
//! Holds one [`TenantLicense`] per tenant behind a `tokio` RwLock. Reads
//! never block each other, so concurrent gate checks for many tenants do
//! not coordinate.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    LicenseAdmin, LicenseStore, LicenseStoreError, ModuleId, SubscriptionStatus, TenantLicense,
};

#[derive(Default)]
pub struct InMemoryLicenseStore {
    tenants: RwLock<HashMap<String, TenantLicense>>,
}

impl InMemoryLicenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a list of records.
    pub fn from_licenses(
        licenses: impl IntoIterator<Item = TenantLicense>,
    ) -> Result<Self, LicenseStoreError> {
        let mut tenants = HashMap::new();
        for license in licenses {
            let tenant_id = license.tenant_id.clone();
            if tenants.insert(tenant_id.clone(), license).is_some() {
                return Err(LicenseStoreError::DuplicateTenant(tenant_id));
            }
        }
        Ok(Self {
            tenants: RwLock::new(tenants),
        })
    }

    /// Load records from a JSON file holding an array of [`TenantLicense`].
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, LicenseStoreError> {
        let raw = std::fs::read(path.as_ref())?;
        let licenses: Vec<TenantLicense> = serde_json::from_slice(&raw)?;
        let store = Self::from_licenses(licenses)?;
        tracing::info!(
            path = %path.as_ref().display(),
            "loaded tenant licensing seed"
        );
        Ok(store)
    }

    /// Insert or replace a tenant's record.
    pub async fn upsert(&self, license: TenantLicense) {
        let mut tenants = self.tenants.write().await;
        tenants.insert(license.tenant_id.clone(), license);
    }

    pub async fn len(&self) -> usize {
        self.tenants.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tenants.read().await.is_empty()
    }
}

#[async_trait]
impl LicenseStore for InMemoryLicenseStore {
    async fn tenant_license(
        &self,
        tenant_id: &str,
    ) -> Result<Option<TenantLicense>, LicenseStoreError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_id).cloned())
    }
}

#[async_trait]
impl LicenseAdmin for InMemoryLicenseStore {
    async fn grant_module(
        &self,
        tenant_id: &str,
        module: ModuleId,
    ) -> Result<TenantLicense, LicenseStoreError> {
        let mut tenants = self.tenants.write().await;
        let license = tenants
            .entry(tenant_id.to_string())
            .or_insert_with(|| TenantLicense::new(tenant_id));
        license.licensed_modules.insert(module);
        Ok(license.clone())
    }

    async fn revoke_module(
        &self,
        tenant_id: &str,
        module: &ModuleId,
    ) -> Result<Option<TenantLicense>, LicenseStoreError> {
        let mut tenants = self.tenants.write().await;
        Ok(tenants.get_mut(tenant_id).map(|license| {
            license.licensed_modules.remove(module);
            license.clone()
        }))
    }

    async fn set_status(
        &self,
        tenant_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Option<TenantLicense>, LicenseStoreError> {
        let mut tenants = self.tenants.write().await;
        Ok(tenants.get_mut(tenant_id).map(|license| {
            license.status = status;
            license.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::licensing::module::{CRM, FINANCE};
    use std::io::Write;

    #[tokio::test]
    async fn unknown_tenant_has_no_record() {
        let store = InMemoryLicenseStore::new();
        assert!(store.tenant_license("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn grant_then_revoke() {
        let store = InMemoryLicenseStore::new();

        let license = store.grant_module("t1", FINANCE).await.unwrap();
        assert!(license.entitles(&FINANCE));
        assert_eq!(license.status, SubscriptionStatus::Active);

        let license = store.revoke_module("t1", &FINANCE).await.unwrap().unwrap();
        assert!(!license.entitles(&FINANCE));

        assert!(store.revoke_module("t2", &FINANCE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_status_updates_existing_record() {
        let store = InMemoryLicenseStore::from_licenses([TenantLicense::new("t1").with_module(CRM)])
            .unwrap();
        let license = store
            .set_status("t1", SubscriptionStatus::Suspended)
            .await
            .unwrap()
            .unwrap();
        assert!(!license.entitles(&CRM));
        assert!(store
            .set_status("missing", SubscriptionStatus::Active)
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_tenants_are_rejected() {
        let result = InMemoryLicenseStore::from_licenses([
            TenantLicense::new("t1"),
            TenantLicense::new("t1"),
        ]);
        assert!(matches!(result, Err(LicenseStoreError::DuplicateTenant(id)) if id == "t1"));
    }

    #[tokio::test]
    async fn loads_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"tenant_id":"t1","licensed_modules":["crm","finance"],"tier":"professional"}},
                {{"tenant_id":"t2","licensed_modules":[],"status":"trial"}}
            ]"#
        )
        .unwrap();

        let store = InMemoryLicenseStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.len().await, 2);

        let t1 = store.tenant_license("t1").await.unwrap().unwrap();
        assert!(t1.entitles(&FINANCE));
        assert_eq!(t1.tier.as_deref(), Some("professional"));

        let t2 = store.tenant_license("t2").await.unwrap().unwrap();
        assert_eq!(t2.status, SubscriptionStatus::Trial);
    }

    #[test]
    fn bad_seed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"tenant_id":"t1","licensed_modules":["NOT VALID"]}}]"#).unwrap();
        assert!(matches!(
            InMemoryLicenseStore::from_seed_file(file.path()),
            Err(LicenseStoreError::Json(_))
        ));

        assert!(matches!(
            InMemoryLicenseStore::from_seed_file("/definitely/not/here.json"),
            Err(LicenseStoreError::Io(_))
        ));
    }
}
