//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / PROXY_HOST, PROXY_PORT
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing reloads it at runtime
//! - All fields have defaults to allow minimal configs
//! - Header lists and the upstream timeout are fixed, not file-driven

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, UpstreamConfig,
    UPSTREAM_TIMEOUT,
};
pub use validation::{validate_config, ValidationError};
