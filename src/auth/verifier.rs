// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT verification and issuance.
//!
//! Verification is purely computational: the key is configured at startup
//! and no request ever triggers network I/O.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{Claims, WireClaims};
use super::error::AuthError;
use super::roles::{Role, RoleSet};

/// Clock skew tolerance (60 seconds).
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Default lifetime of issued access tokens (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// Verifies bearer tokens against a configured key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Verifier for HS256 tokens signed with a shared secret.
    pub fn hs256(secret: &[u8]) -> Self {
        Self::with_key(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Verifier for RS256 tokens, given the issuer's public key in PEM form.
    pub fn rs256_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::with_key(DecodingKey::from_rsa_pem(pem)?, Algorithm::RS256))
    }

    fn with_key(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = DEFAULT_LEEWAY_SECS;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);
        Self { key, validation }
    }

    /// Require a specific `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.validation.set_issuer(&[issuer.into()]);
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.validation.leeway = seconds;
        self
    }

    /// Verify a raw token and decode its claims.
    ///
    /// The signature is checked before any time-based claim, so a token that
    /// is both tampered and expired reports `InvalidCredential`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<WireClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredCredential,
                _ => AuthError::InvalidCredential,
            }
        })?;

        Claims::try_from(data.claims)
    }
}

/// Signs access tokens.
///
/// The login flow lives outside this service; the issuer is used by
/// operators and tests to mint tokens the verifier accepts.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
    issuer: Option<String>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            issuer: None,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issue a fresh token valid from now until now + TTL.
    pub fn issue(
        &self,
        user_id: &str,
        tenant_id: Option<&str>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims::new(
            user_id,
            tenant_id.map(str::to_string),
            roles.into_iter().collect::<RoleSet>(),
            now.timestamp(),
            (now + self.ttl).timestamp(),
        );
        self.sign(&claims)
    }

    /// Sign an explicit set of claims, timestamps included.
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let mut wire = claims.to_wire();
        wire.iss = self.issuer.clone();
        wire.jti = Some(uuid::Uuid::new_v4().to_string());
        encode(&self.header, &wire, &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &[u8] = b"test-secret-with-enough-entropy";

    fn issuer() -> TokenIssuer {
        TokenIssuer::hs256(SECRET)
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::hs256(SECRET)
    }

    fn expired_claims() -> Claims {
        let now = Utc::now().timestamp();
        Claims::new(
            "user_1",
            Some("tenant_a".into()),
            [Role::Admin].into_iter().collect(),
            now - 7200,
            now - 3600,
        )
    }

    /// Swap the payload segment while keeping the original signature.
    fn tamper(token: &str, payload: &str) -> String {
        let parts: Vec<&str> = token.split('.').collect();
        format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            parts[2]
        )
    }

    #[test]
    fn valid_token_round_trips_identity() {
        let token = issuer()
            .issue("user_1", Some("tenant_a"), [Role::Owner, Role::Member])
            .unwrap();
        let claims = verifier().verify(&token).unwrap();

        assert_eq!(claims.user_id(), "user_1");
        assert_eq!(claims.tenant_id(), Some("tenant_a"));
        let expected: RoleSet = [Role::Owner, Role::Member].into_iter().collect();
        assert_eq!(claims.roles(), &expected);
    }

    #[test]
    fn signed_claims_come_back_unchanged() {
        let now = Utc::now().timestamp();
        let claims = Claims::new(
            "user_9",
            None,
            [Role::SuperAdmin].into_iter().collect(),
            now,
            now + 600,
        );
        let token = issuer().sign(&claims).unwrap();
        assert_eq!(verifier().verify(&token).unwrap(), claims);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let token = issuer().sign(&expired_claims()).unwrap();
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::ExpiredCredential)
        ));
    }

    #[test]
    fn leeway_tolerates_small_skew() {
        let now = Utc::now().timestamp();
        let claims = Claims::new("u", None, RoleSet::new(), now - 100, now - 10);
        let token = issuer().sign(&claims).unwrap();
        assert!(verifier().verify(&token).is_ok());
        assert!(matches!(
            verifier().with_leeway(0).verify(&token),
            Err(AuthError::ExpiredCredential)
        ));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let token = issuer().issue("user_1", Some("tenant_a"), [Role::Member]).unwrap();
        let forged = tamper(
            &token,
            r#"{"sub":"user_1","tenantId":"tenant_b","roles":["super_admin"],"exp":9999999999}"#,
        );
        assert!(matches!(
            verifier().verify(&forged),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn expired_and_tampered_never_yields_claims() {
        let token = issuer().sign(&expired_claims()).unwrap();
        let forged = tamper(&token, r#"{"sub":"intruder","exp":1}"#);
        assert!(matches!(
            verifier().verify(&forged),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = TokenIssuer::hs256(b"another-secret")
            .issue("user_1", None, [])
            .unwrap();
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        for raw in ["", "not-a-jwt", "a.b", "a.b.c", "...."] {
            assert!(
                matches!(verifier().verify(raw), Err(AuthError::InvalidCredential)),
                "{raw:?} should be invalid"
            );
        }
    }

    #[test]
    fn unexpected_algorithm_is_invalid() {
        let header = Header::new(Algorithm::HS384);
        let wire = expired_claims().to_wire();
        let token = encode(&header, &wire, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(matches!(
            verifier().verify(&token),
            Err(AuthError::InvalidCredential)
        ));
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let strict = verifier().with_issuer("https://suite.example");
        let good = issuer()
            .with_issuer("https://suite.example")
            .issue("u", None, [])
            .unwrap();
        let bad = issuer()
            .with_issuer("https://elsewhere.example")
            .issue("u", None, [])
            .unwrap();

        assert!(strict.verify(&good).is_ok());
        assert!(matches!(strict.verify(&bad), Err(AuthError::InvalidCredential)));
    }

    #[test]
    fn legacy_single_role_token_is_accepted() {
        let exp = Utc::now().timestamp() + 600;
        let payload = serde_json::json!({
            "userId": "user_legacy",
            "tenantId": "tenant_a",
            "role": "SUPER_ADMIN",
            "licensedModules": ["crm"],
            "exp": exp,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let claims = verifier().verify(&token).unwrap();
        assert_eq!(claims.user_id(), "user_legacy");
        assert!(claims.roles().contains(Role::SuperAdmin));
    }
}
