//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the effective configuration (file, then CLI/env overrides)
//! - Tell the operator how to point a client at the proxy

use std::net::SocketAddr;
use std::path::Path;

use crate::config::{load_config, validate_config, ConfigError, ProxyConfig};

/// Build the effective configuration.
///
/// `host`/`port` override whatever the file (or the defaults) say.
pub fn resolve_config(
    path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(host) = host {
        config.listener.host = host;
    }
    if let Some(port) = port {
        config.listener.port = port;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Log the startup banner for a proxy listening on `addr`.
pub fn log_banner(addr: SocketAddr) {
    let client_host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        addr.ip().to_string()
    };

    tracing::info!(address = %addr, "Forward proxy listening");
    tracing::info!(
        proxy_host = %client_host,
        proxy_port = addr.port(),
        "Point your browser or HTTP client at this proxy"
    );
}
