// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Module identifiers and the known module catalog.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Maximum length of a module key.
const MAX_MODULE_ID_LEN: usize = 32;

/// Identifier of a licensable module (`"crm"`, `"finance"`, ...).
///
/// Keys are short lowercase ASCII strings: letters, digits and `-`,
/// starting with a letter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(Cow<'static, str>);

/// Rejected module key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid module id `{0}`")]
pub struct InvalidModuleId(pub String);

impl ModuleId {
    pub fn parse(raw: &str) -> Result<Self, InvalidModuleId> {
        if is_valid_key(raw) {
            Ok(Self(Cow::Owned(raw.to_string())))
        } else {
            Err(InvalidModuleId(raw.to_string()))
        }
    }

    const fn known(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the key belongs to the built-in catalog.
    pub fn is_known(&self) -> bool {
        CATALOG.iter().any(|m| m.as_str() == self.as_str())
    }
}

fn is_valid_key(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    raw.len() <= MAX_MODULE_ID_LEN
        && first.is_ascii_lowercase()
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleId {
    type Error = InvalidModuleId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_key(&value) {
            Ok(Self(Cow::Owned(value)))
        } else {
            Err(InvalidModuleId(value))
        }
    }
}

impl From<ModuleId> for String {
    fn from(id: ModuleId) -> Self {
        id.0.into_owned()
    }
}

/// Compile-time module declaration for route extractors.
pub trait ModuleKey: Send + Sync + 'static {
    const MODULE: ModuleId;
}

pub const CRM: ModuleId = ModuleId::known("crm");
pub const FINANCE: ModuleId = ModuleId::known("finance");
pub const SALES: ModuleId = ModuleId::known("sales");
pub const MARKETING: ModuleId = ModuleId::known("marketing");
pub const HR: ModuleId = ModuleId::known("hr");
pub const PROJECTS: ModuleId = ModuleId::known("projects");
pub const INVENTORY: ModuleId = ModuleId::known("inventory");
pub const COMMUNICATION: ModuleId = ModuleId::known("communication");
pub const ANALYTICS: ModuleId = ModuleId::known("analytics");
pub const AI_STUDIO: ModuleId = ModuleId::known("ai-studio");
pub const PRODUCTIVITY: ModuleId = ModuleId::known("productivity");
pub const WORKFLOW: ModuleId = ModuleId::known("workflow");

/// Modules sold today.
pub const CATALOG: &[ModuleId] = &[
    CRM,
    FINANCE,
    SALES,
    MARKETING,
    HR,
    PROJECTS,
    INVENTORY,
    COMMUNICATION,
    ANALYTICS,
    AI_STUDIO,
    PRODUCTIVITY,
    WORKFLOW,
];

/// Marker for routes of the CRM module.
pub struct Crm;

impl ModuleKey for Crm {
    const MODULE: ModuleId = CRM;
}

/// Marker for routes of the finance module.
pub struct Finance;

impl ModuleKey for Finance {
    const MODULE: ModuleId = FINANCE;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_catalog_keys() {
        for module in CATALOG {
            assert_eq!(ModuleId::parse(module.as_str()).as_ref(), Ok(module));
        }
    }

    #[test]
    fn parse_rejects_bad_keys() {
        for raw in ["", "CRM", "1crm", "crm/leads", "crm ", "a".repeat(33).as_str()] {
            assert!(ModuleId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn serde_validates() {
        let id: ModuleId = serde_json::from_str(r#""finance""#).unwrap();
        assert_eq!(id, FINANCE);
        assert!(serde_json::from_str::<ModuleId>(r#""Fin ance""#).is_err());
        assert_eq!(serde_json::to_string(&CRM).unwrap(), r#""crm""#);
    }

    #[test]
    fn borrowed_and_owned_compare_equal() {
        assert_eq!(ModuleId::parse("crm").unwrap(), CRM);
        assert!(ModuleId::parse("crm").unwrap().is_known());
        assert!(!ModuleId::parse("payroll-plus").unwrap().is_known());
    }
}
