//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Perform exactly one call to the resolved origin
//! - Never follow redirects; 3xx responses are relayed as-is
//! - Bound the whole call (connect + transfer) by a single deadline
//! - Materialize the full response body before handing it back
//!
//! # Design Decisions
//! - Environment proxy settings are ignored so the proxy never chains itself
//! - Compressed bodies are decoded; encoding headers are dropped downstream
//! - Timeouts are distinct from other transport failures

use std::error::Error as StdError;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use reqwest::redirect::Policy;

use crate::error::UpstreamError;
use crate::http::headers::HeaderList;
use crate::routing::TargetUrl;

/// Raw response from the origin.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderList,
    pub body: Bytes,
}

/// Client for the single upstream call each request makes.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client whose calls are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .no_proxy()
            .http1_title_case_headers()
            .build()?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward one request to `target`.
    ///
    /// `body` is sent only when present; `cookies` become a `Cookie` header
    /// when the outbound headers do not already carry one.
    pub async fn forward(
        &self,
        target: &TargetUrl,
        method: &Method,
        headers: &HeaderList,
        body: Option<Bytes>,
        cookies: &[(String, String)],
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut outbound = HeaderList::new();
        for (name, value) in headers.iter() {
            if *name == header::CONTENT_LENGTH && body.is_none() {
                continue;
            }
            outbound.push(name.clone(), value.clone());
        }
        if !outbound.contains(header::COOKIE.as_str()) && !cookies.is_empty() {
            if let Some(cookie) = cookie_header(cookies) {
                outbound.push(header::COOKIE, cookie);
            }
        }

        let mut request = self
            .client
            .request(method.clone(), target.as_url().clone())
            .headers(outbound.to_header_map());
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        let headers = HeaderList::from(response.headers());
        let body = response.bytes().await.map_err(classify)?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

fn cookie_header(cookies: &[(String, String)]) -> Option<HeaderValue> {
    let joined = cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    HeaderValue::from_str(&joined).ok()
}

fn classify(error: reqwest::Error) -> UpstreamError {
    let description = describe(&error);
    if error.is_timeout() {
        UpstreamError::timeout(description)
    } else {
        UpstreamError::connection_failed(description)
    }
}

/// Error message followed by its source chain.
fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut description = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}
