//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use forward_proxy::config::ProxyConfig;
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::Shutdown;
use reqwest::redirect::Policy;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

/// Serve `app` on an ephemeral loopback port.
pub async fn start_origin(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Origin that echoes what it received and exercises a few edge routes.
pub fn echo_origin() -> Router {
    Router::new()
        .route(
            "/redirect",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/elsewhere")]) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "late"
            }),
        )
        .route(
            "/cors",
            get(|| async { ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://app.example")], "cors") }),
        )
        .fallback(echo)
}

/// Text served by [`gzip_origin`], long enough to be worth compressing.
pub fn gzip_payload() -> String {
    "forward proxy relays decoded bodies\n".repeat(64)
}

/// Origin that gzips its responses when the caller accepts it.
pub fn gzip_origin() -> Router {
    Router::new()
        .fallback(|headers: HeaderMap| async move {
            let accepted = headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, "text/plain".to_string()),
                    (HeaderName::from_static("x-accept-encoding"), accepted),
                ],
                gzip_payload(),
            )
        })
        .layer(CompressionLayer::new())
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let received: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    (
        StatusCode::CREATED,
        [(HeaderName::from_static("x-origin"), "echo")],
        Json(json!({
            "method": method.as_str(),
            "uri": uri.to_string(),
            "headers": received,
            "body": String::from_utf8_lossy(&body),
        })),
    )
}

/// Start the proxy on an ephemeral loopback port.
pub async fn start_proxy(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let listener = TcpListener::bind(config.listener.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client talking to the proxy as if it were the destination.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// Client configured to use the proxy (absolute-form request lines).
pub fn proxied_client(proxy: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy}")).unwrap())
        .redirect(Policy::none())
        .build()
        .unwrap()
}

/// Proxied client that leaves response bodies encoded.
pub fn raw_proxied_client(proxy: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy}")).unwrap())
        .redirect(Policy::none())
        .no_gzip()
        .build()
        .unwrap()
}

/// A loopback address nothing is listening on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
