// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HS256 verification secret | Required unless `JWT_PUBLIC_KEY_PATH` is set |
//! | `JWT_PUBLIC_KEY_PATH` | RS256 public key (PEM) | Optional, wins over `JWT_SECRET` |
//! | `JWT_ISSUER` | Expected `iss` claim | Not validated |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance | `60` |
//! | `AUTH_COOKIE_NAME` | Session cookie carrying the token | `token` |
//! | `LICENSES_FILE` | JSON seed of tenant licensing records | Empty store |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS with these PEM files | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::credential::DEFAULT_COOKIE_NAME;
use crate::auth::verifier::DEFAULT_LEEWAY_SECS;
use crate::auth::TokenVerifier;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_PUBLIC_KEY_PATH_ENV: &str = "JWT_PUBLIC_KEY_PATH";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const AUTH_COOKIE_NAME_ENV: &str = "AUTH_COOKIE_NAME";
pub const LICENSES_FILE_ENV: &str = "LICENSES_FILE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Shortest HS256 secret accepted at startup.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no verification key configured: set JWT_SECRET or JWT_PUBLIC_KEY_PATH")]
    MissingKey,
    #[error("JWT_SECRET must be at least 32 bytes")]
    WeakSecret,
    #[error("failed to read {}: {source}", path.display())]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid public key in {}: {source}", path.display())]
    InvalidKey {
        path: PathBuf,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// Token verification key material.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Secret(String),
    RsaPublicKeyPem(PathBuf),
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMaterial::Secret(_) => f.write_str("Secret(<redacted>)"),
            KeyMaterial::RsaPublicKeyPem(path) => f.debug_tuple("RsaPublicKeyPem").field(path).finish(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub bind_addr: SocketAddr,
    pub key: KeyMaterial,
    pub issuer: Option<String>,
    pub leeway_secs: u64,
    pub cookie_name: String,
    pub licenses_file: Option<PathBuf>,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl GateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => parse_value(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr = parse_value::<SocketAddr>(HOST_ENV, &format!("{host}:{port}"))?;

        let key = match (var(JWT_PUBLIC_KEY_PATH_ENV), var(JWT_SECRET_ENV)) {
            (Some(path), _) => KeyMaterial::RsaPublicKeyPem(PathBuf::from(path)),
            (None, Some(secret)) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::WeakSecret)
            }
            (None, Some(secret)) => KeyMaterial::Secret(secret),
            (None, None) => return Err(ConfigError::MissingKey),
        };

        let leeway_secs = match var(JWT_LEEWAY_ENV) {
            Some(raw) => parse_value(JWT_LEEWAY_ENV, &raw)?,
            None => DEFAULT_LEEWAY_SECS,
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            bind_addr,
            key,
            issuer: var(JWT_ISSUER_ENV),
            leeway_secs,
            cookie_name: var(AUTH_COOKIE_NAME_ENV).unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            licenses_file: var(LICENSES_FILE_ENV).map(PathBuf::from),
            tls,
            log_format,
        })
    }

    /// Build the token verifier described by this configuration.
    pub fn verifier(&self) -> Result<TokenVerifier, ConfigError> {
        let verifier = match &self.key {
            KeyMaterial::Secret(secret) => TokenVerifier::hs256(secret.as_bytes()),
            KeyMaterial::RsaPublicKeyPem(path) => {
                let pem = std::fs::read(path).map_err(|source| ConfigError::ReadKey {
                    path: path.clone(),
                    source,
                })?;
                TokenVerifier::rs256_pem(&pem).map_err(|source| ConfigError::InvalidKey {
                    path: path.clone(),
                    source,
                })?
            }
        };

        let verifier = verifier.with_leeway(self.leeway_secs);
        Ok(match &self.issuer {
            Some(issuer) => verifier.with_issuer(issuer.clone()),
            None => verifier,
        })
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}
