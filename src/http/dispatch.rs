//! Per-request orchestration.
//!
//! Resolve target → filter headers → call origin → compose response.
//! A forwarded Host header always names the resolved origin.
//! Every failure becomes a response; nothing here can take the server down.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::{IntoResponse, Response};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::client::UpstreamClient;
use crate::http::request::{request_id, InboundRequest};
use crate::http::response::{compose, ProxiedResponse};
use crate::observability::metrics;
use crate::routing::TargetResolver;
use crate::security::headers::filter_inbound;

/// Entry point the server runtime hands each request to.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<ProxyConfig>,
    resolver: TargetResolver,
    client: UpstreamClient,
}

impl Dispatcher {
    pub fn new(config: Arc<ProxyConfig>, resolver: TargetResolver, client: UpstreamClient) -> Self {
        Self {
            config,
            resolver,
            client,
        }
    }

    /// Relay one request and always produce a response.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let request_id = request_id(request.headers());
        let method = request.method().to_string();

        match self.forward(request, &request_id).await {
            Ok(proxied) => {
                metrics::record_request(&method, proxied.status.as_u16(), "relayed", start_time);
                proxied.into_response()
            }
            Err(e) => {
                match &e {
                    ProxyError::InvalidTarget { candidate } => {
                        tracing::warn!(request_id = %request_id, candidate = %candidate, "Invalid URL");
                    }
                    ProxyError::MethodNotAllowed(m) => {
                        tracing::warn!(request_id = %request_id, method = %m, "Method not relayed");
                    }
                    ProxyError::Upstream(err) => {
                        tracing::error!(request_id = %request_id, kind = ?err.kind, error = %err, "Upstream error");
                    }
                    ProxyError::Unexpected(msg) => {
                        tracing::error!(request_id = %request_id, error = %msg, "Unexpected error");
                    }
                }
                metrics::record_request(&method, e.status().as_u16(), e.outcome(), start_time);
                e.into_response()
            }
        }
    }

    async fn forward(
        &self,
        request: Request<Body>,
        request_id: &str,
    ) -> Result<ProxiedResponse, ProxyError> {
        let inbound = InboundRequest::from_request(request, self.config.limits.max_body_bytes).await?;
        let target = self.resolver.resolve(&inbound)?;

        tracing::info!(
            request_id = %request_id,
            method = %inbound.method,
            target = %target,
            "Proxying request"
        );

        let mut headers = filter_inbound(&inbound.headers);
        if let Some(host) = target.host_header() {
            headers.replace(header::HOST, host);
        }
        let upstream = self
            .client
            .forward(&target, &inbound.method, &headers, inbound.body, &inbound.cookies)
            .await?;

        tracing::info!(
            request_id = %request_id,
            status = upstream.status.as_u16(),
            target = %target,
            "Upstream responded"
        );

        Ok(compose(upstream))
    }
}
