//! Best-effort TLS listener for the relay

use super::{create_router, RelayState};
use crate::config::RelayConfig;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Certificate file name inside the certificate directory
pub const CERT_FILE: &str = "localhost.crt";

/// Private key file name inside the certificate directory
pub const KEY_FILE: &str = "localhost.key";

/// Locate the development certificate pair in `dir`
///
/// Returns `(certificate, key)` when both files exist.
pub fn find_dev_certificates(dir: &Path) -> Option<(PathBuf, PathBuf)> {
    let cert = dir.join(CERT_FILE);
    let key = dir.join(KEY_FILE);
    (cert.is_file() && key.is_file()).then_some((cert, key))
}

/// Start the TLS listener in the background
///
/// Missing certificates, an unreadable pair or a bind failure are logged;
/// none of them are returned to the caller.
pub async fn start(config: &RelayConfig, state: Arc<RelayState>, handle: axum_server::Handle) {
    let Some(dir) = config.resolved_cert_dir() else {
        tracing::warn!("Could not determine the home directory; HTTPS relay not started");
        return;
    };

    let Some((cert, key)) = find_dev_certificates(&dir) else {
        tracing::warn!(
            "SSL certificates not found in {}. HTTPS relay not started. \
             Run 'npx office-addin-dev-certs install' to create them.",
            dir.display()
        );
        return;
    };

    let addr: SocketAddr = match format!("{}:{}", config.bind_address, config.https_port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid HTTPS relay address: {}", e);
            return;
        }
    };

    let tls_config = match RustlsConfig::from_pem_file(&cert, &key).await {
        Ok(tls_config) => tls_config,
        Err(e) => {
            tracing::error!("Failed to load certificates from {}: {}", dir.display(), e);
            return;
        }
    };

    let app = create_router(state);
    tokio::spawn(async move {
        tracing::info!("HTTPS relay running on https://{}", addr);
        if let Err(e) = axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTPS relay stopped: {}", e);
        }
    });
}
