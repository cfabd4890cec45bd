//! Failure taxonomy for a single proxied request.
//!
//! Every variant maps to exactly one caller-facing status code; see
//! [`ProxyError::status`]. Errors never cross request boundaries.

use axum::http::{Method, StatusCode};
use thiserror::Error;

/// Why an upstream call did not produce a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// The call exceeded the upstream deadline.
    Timeout,
    /// DNS, connect, TLS or protocol failure.
    ConnectionFailed,
}

/// Failure of the single upstream call.
#[derive(Debug, Clone, Error)]
#[error("{description}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub description: String,
}

impl UpstreamError {
    pub fn timeout(description: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Timeout,
            description: description.into(),
        }
    }

    pub fn connection_failed(description: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::ConnectionFailed,
            description: description.into(),
        }
    }
}

/// Errors surfaced by the request dispatcher.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No origin distinct from the proxy could be determined.
    #[error("Invalid URL")]
    InvalidTarget { candidate: String },

    /// Request method the proxy does not relay.
    #[error("Method Not Allowed")]
    MethodNotAllowed(Method),

    /// The origin was unreachable or too slow.
    #[error("Proxy Error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Anything else that went wrong while dispatching.
    #[error("Internal Server Error: {0}")]
    Unexpected(String),
}

impl ProxyError {
    pub fn invalid_target(candidate: impl Into<String>) -> Self {
        Self::InvalidTarget {
            candidate: candidate.into(),
        }
    }

    /// Caller-facing status code for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::InvalidTarget { .. } => "invalid_target",
            ProxyError::MethodNotAllowed(_) => "method_not_allowed",
            ProxyError::Upstream(e) => match e.kind {
                UpstreamErrorKind::Timeout => "upstream_timeout",
                UpstreamErrorKind::ConnectionFailed => "upstream_unreachable",
            },
            ProxyError::Unexpected(_) => "internal_error",
        }
    }
}
