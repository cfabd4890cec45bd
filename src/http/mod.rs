//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → dispatch.rs (per-request orchestration)
//!         → request.rs (capture InboundRequest, request ID)
//!         → [routing resolves the target origin]
//!         → [security filters outbound headers]
//!         → client.rs (single upstream call)
//!         → response.rs (compose, filter, add CORS)
//!     → Send to client
//! ```

pub mod client;
pub mod dispatch;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use client::{UpstreamClient, UpstreamResponse};
pub use dispatch::Dispatcher;
pub use headers::HeaderList;
pub use request::{request_id_layer, InboundRequest, X_REQUEST_ID};
pub use response::{compose, ProxiedResponse};
pub use server::{AppState, HttpServer};
