//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic capture)
//! - Bind the proxy identity to the listener's actual address
//! - Hand every non-health request to the dispatcher

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::health::health_check;
use crate::http::client::UpstreamClient;
use crate::http::dispatch::Dispatcher;
use crate::http::request::request_id_layer;
use crate::lifecycle::shutdown::triggered;
use crate::routing::{ProxyIdentity, TargetResolver};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the forward proxy.
pub struct HttpServer {
    config: Arc<ProxyConfig>,
    client: UpstreamClient,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = UpstreamClient::new(config.upstream.timeout)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Build the Axum router for a proxy reachable at `local_addr`.
    pub fn router(&self, local_addr: SocketAddr) -> Router {
        let identity =
            ProxyIdentity::from_local_addr(local_addr, self.config.listener.public_host.as_deref());
        tracing::debug!(identity = ?identity, "Proxy identity");

        let dispatcher = Dispatcher::new(
            self.config.clone(),
            TargetResolver::new(identity),
            self.client.clone(),
        );
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
        };

        Router::new()
            .route("/health", get(health_handler).fallback(proxy_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(CatchPanicLayer::custom(panic_response)),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let app = self.router(addr);

        tracing::info!(
            address = %addr,
            upstream_timeout_secs = self.client.timeout().as_secs(),
            "HTTP server starting"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(triggered(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `/health` in origin-form is answered locally; an absolute-form request
/// whose path happens to be `/health` is still proxied.
async fn health_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    if request.uri().scheme().is_some() {
        return state.dispatcher.dispatch(request).await;
    }
    health_check().await.into_response()
}

async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.dispatch(request).await
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    };
    tracing::error!(error = %detail, "Request handler panicked");
    ProxyError::Unexpected(detail).into_response()
}
