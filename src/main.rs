// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{error, info, warn};

use site_gate::{
    api::router,
    config::{EnvConfigProvider, Settings},
    state::AppState,
    telemetry::init_tracing,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Configuration is resolved once; nothing reads the environment after this.
    let settings = Settings::resolve(&EnvConfigProvider).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    });

    init_tracing(settings.log_format);

    if !settings.gate_configured() {
        warn!(
            environment = %settings.environment,
            "ACCESS_TOKEN is not set; every token validation will fail with a configuration error"
        );
    }

    let addr: SocketAddr = settings.bind_address().parse().unwrap_or_else(|e| {
        error!(address = %settings.bind_address(), error = %e, "failed to parse bind address");
        process::exit(1);
    });

    let tls = settings.tls.clone();
    let environment = settings.environment;

    let state = AppState::new(settings).unwrap_or_else(|e| {
        error!(error = %e, "failed to initialise contact delivery");
        process::exit(1);
    });
    let app = router(state);

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown signal received, draining connections");
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    let result = match tls {
        Some(paths) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                warn!("rustls crypto provider was already installed");
            }

            let tls_config = match RustlsConfig::from_pem_file(&paths.cert, &paths.key).await {
                Ok(config) => config,
                Err(e) => {
                    error!(
                        cert = %paths.cert.display(),
                        key = %paths.key.display(),
                        error = %e,
                        "failed to load TLS certificate"
                    );
                    process::exit(1);
                }
            };

            info!(%environment, "site gate listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!(%environment, "site gate listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "server failed");
        process::exit(1);
    }
    info!("server stopped");
}

