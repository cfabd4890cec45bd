//! Request handling and transformation.
//!
//! # Responsibilities
//! - Assign a unique request ID for tracing
//! - Capture the inbound request as an immutable `InboundRequest`
//! - Read the body only for methods that carry one, within size limits
//! - Extract cookies presented by the caller
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The request ID is for logs only: it is neither forwarded nor echoed

use axum::body::{to_bytes, Body};
use axum::http::uri::Scheme;
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Uri};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

use crate::error::ProxyError;
use crate::http::headers::HeaderList;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Methods the proxy relays.
pub static RELAYED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::HEAD,
];

/// Layer stamping every request with a UUID `x-request-id`.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Request ID assigned by [`request_id_layer`], or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Whether a body is read and relayed for `method`.
pub fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// A caller's request as received by the proxy.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Request target as received: absolute-form or origin-form.
    pub uri: Uri,
    pub headers: HeaderList,
    /// Present only for POST/PUT/PATCH.
    pub body: Option<Bytes>,
    pub cookies: Vec<(String, String)>,
    /// Whether the request arrived over https.
    pub secure: bool,
}

impl InboundRequest {
    /// Capture an axum request, reading at most `max_body_bytes` of body.
    pub async fn from_request(
        request: Request<Body>,
        max_body_bytes: usize,
    ) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();

        if !RELAYED_METHODS.contains(&parts.method) {
            return Err(ProxyError::MethodNotAllowed(parts.method));
        }

        let body = if carries_body(&parts.method) {
            let bytes = to_bytes(body, max_body_bytes)
                .await
                .map_err(|e| ProxyError::Unexpected(format!("failed to read request body: {e}")))?;
            Some(bytes)
        } else {
            None
        };

        let headers = HeaderList::from(&parts.headers);
        let cookies = parse_cookies(&headers);
        let secure = parts.uri.scheme() == Some(&Scheme::HTTPS);

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers,
            body,
            cookies,
            secure,
        })
    }

    /// Value of the `Host` header, if present and valid text.
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(header::HOST.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Parse `name=value` pairs from every `Cookie` header.
pub fn parse_cookies(headers: &HeaderList) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE.as_str())
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}
