//! Header security subsystem.
//!
//! # Data Flow
//! ```text
//! Caller headers
//!     → headers.rs filter_inbound (allow-list)
//!     → origin
//! Origin headers
//!     → headers.rs filter_outbound (block-list + CORS)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - Both lists are fixed at compile time and shared read-only
//! - Matching is case-insensitive; `HeaderName` is already lowercase

pub mod headers;

pub use headers::{filter_inbound, filter_outbound};
