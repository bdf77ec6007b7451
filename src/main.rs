// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tenant_gate::{
    api::router,
    config::GateConfig,
    licensing::InMemoryLicenseStore,
    state::AppState,
    telemetry::init_tracing,
};

/// Time given to in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = GateConfig::from_env()?;
    init_tracing(config.log_format)?;

    let store = match &config.licenses_file {
        Some(path) => InMemoryLicenseStore::from_seed_file(path)?,
        None => {
            tracing::warn!("LICENSES_FILE not set, starting with no licensed tenants");
            InMemoryLicenseStore::new()
        }
    };

    let state = AppState::new(config.verifier()?, Arc::new(store))
        .with_cookie_name(&config.cookie_name);
    let app = router(state);

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            tracing::info!(%addr, "Tenant gate listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Tenant gate listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Tenant gate stopped");
    Ok(())
}

async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
