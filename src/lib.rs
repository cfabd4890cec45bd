//! Forward HTTP Proxy Library
//!
//! Relays any inbound request to the origin the caller names (absolute-form
//! request line, a URL embedded in the path, or the Host header) and relays
//! the origin's answer back with permissive CORS headers.

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, UpstreamError, UpstreamErrorKind};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
