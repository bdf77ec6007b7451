// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential extraction.
//!
//! A request may carry its token in `Authorization: Bearer <token>` (API
//! clients) or in a cookie (browser sessions). The header wins when both are
//! present. Absence is a normal outcome for public routes and is returned as
//! `None`, never as an error.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};

/// Default name of the session cookie holding the token.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Where a credential was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    AuthorizationHeader,
    Cookie,
}

/// Raw, unverified bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Extract the bearer credential from request headers.
pub fn extract_credential(headers: &HeaderMap, cookie_name: &str) -> Option<Credential> {
    if let Some(token) = bearer_token(headers) {
        return Some(Credential {
            token,
            source: CredentialSource::AuthorizationHeader,
        });
    }

    cookie_value(headers, cookie_name).map(|token| Credential {
        token,
        source: CredentialSource::Cookie,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
