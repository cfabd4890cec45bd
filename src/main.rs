//! Forward HTTP Proxy
//!
//! Point a browser or HTTP client at this process instead of the real
//! destination; every request is relayed to the origin it names.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────┐   ┌───────────┐   ┌──────────┐
//!     ────────────────────────▶│  http    │──▶│  routing  │──▶│ security │
//!                              │  server  │   │ resolver  │   │ headers  │
//!                              └──────────┘   └───────────┘   └────┬─────┘
//!                                                                  │
//!                                                                  ▼
//!     Client Response          ┌──────────┐   ┌───────────┐   ┌──────────┐
//!     ◀────────────────────────│ response │◀──│  security │◀──│ upstream │◀──── Origin
//!                              │ compose  │   │  + CORS   │   │  client  │
//!                              └──────────┘   └───────────┘   └──────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::{startup, wait_for_signal, Shutdown};
use forward_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "forward-proxy")]
#[command(about = "Forward HTTP proxy with permissive CORS", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long, env = "PROXY_HOST")]
    host: Option<String>,

    /// Port to bind.
    #[arg(short, long, env = "PROXY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: ProxyConfig = startup::resolve_config(cli.config.as_deref(), cli.host, cli.port)?;
    logging::init_logging(&config.observability);

    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    startup::log_banner(local_addr);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
