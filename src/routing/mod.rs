//! Target resolution subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (request target, Host header, scheme)
//!     → resolver.rs (strip proxy prefix, pick absolute form or Host)
//!     → Return: TargetUrl or InvalidTarget
//!
//! Identity (at bind time):
//!     bound SocketAddr + listener.public_host
//!     → ProxyIdentity (immutable)
//! ```
//!
//! # Design Decisions
//! - Identity fixed at startup, immutable at runtime
//! - Deterministic: same input always resolves to the same target
//! - A request that can only reach the proxy itself is rejected

pub mod resolver;

pub use resolver::{ProxyIdentity, TargetResolver, TargetUrl};
