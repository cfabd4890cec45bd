//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform the origin response for the caller
//! - Strip hop-by-hop headers, append CORS headers
//! - Map proxy errors to plain-text responses with the right status code
//!
//! # Design Decisions
//! - Status and body are relayed byte-for-byte
//! - Composition is pure and cannot fail
//! - Error responses carry no CORS headers

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::ProxyError;
use crate::http::client::UpstreamResponse;
use crate::http::headers::HeaderList;
use crate::security::headers::filter_outbound;

/// Caller-facing response built from an origin response.
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderList,
    pub body: Bytes,
}

/// Build the caller-facing response: status and body unchanged, headers filtered.
pub fn compose(upstream: UpstreamResponse) -> ProxiedResponse {
    ProxiedResponse {
        status: upstream.status,
        headers: filter_outbound(&upstream.headers),
        body: upstream.body,
    }
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        response
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use axum::http::{header, HeaderName, HeaderValue};

    fn upstream() -> UpstreamResponse {
        let headers = [
            ("content-type", "text/html"),
            ("content-length", "11"),
            ("transfer-encoding", "chunked"),
            ("set-cookie", "a=1"),
            ("set-cookie", "b=2"),
        ]
        .into_iter()
        .map(|(n, v)| (HeaderName::from_static(n), HeaderValue::from_static(v)))
        .collect();

        UpstreamResponse {
            status: StatusCode::CREATED,
            headers,
            body: Bytes::from_static(b"hello world"),
        }
    }

    #[test]
    fn test_compose_relays_status_and_body() {
        let composed = compose(upstream());

        assert_eq!(composed.status, StatusCode::CREATED);
        assert_eq!(composed.body, Bytes::from_static(b"hello world"));
        assert!(!composed.headers.contains("content-length"));
        assert!(!composed.headers.contains("transfer-encoding"));
        assert_eq!(composed.headers.get_all("set-cookie").count(), 2);
        assert_eq!(composed.headers.get("access-control-allow-origin").unwrap(), "*");
    }

    #[test]
    fn test_compose_passes_redirects_through() {
        let mut redirect = upstream();
        redirect.status = StatusCode::FOUND;
        redirect.headers.push(header::LOCATION, HeaderValue::from_static("/elsewhere"));

        let composed = compose(redirect);
        assert_eq!(composed.status, StatusCode::FOUND);
        assert_eq!(composed.headers.get("location").unwrap(), "/elsewhere");
    }

    #[test]
    fn test_into_response_keeps_duplicates() {
        let response = compose(upstream()).into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
        assert_eq!(
            response.headers().get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(),
            1
        );
    }

    #[tokio::test]
    async fn test_error_responses() {
        let response = ProxyError::invalid_target("/foo").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Invalid URL");

        let response = ProxyError::from(UpstreamError::connection_failed("Connection refused")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Proxy Error: Connection refused");

        let response = ProxyError::Unexpected("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
