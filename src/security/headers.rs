//! Header allow-list and response header discipline.
//!
//! # Responsibilities
//! - Forward only allow-listed request headers to the origin
//! - Strip hop-by-hop and re-encoding-invalidated response headers
//! - Append permissive CORS headers to every relayed response
//!
//! # Design Decisions
//! - Allow-list, not block-list, on the way out: unknown headers never leak
//! - CORS headers are appended unconditionally; origin duplicates are kept

use axum::http::{header, HeaderName, HeaderValue};

use crate::http::headers::HeaderList;

/// Request headers relayed to the origin.
pub static FORWARDED_HEADERS: [HeaderName; 12] = [
    header::USER_AGENT,
    header::ACCEPT,
    header::ACCEPT_ENCODING,
    header::ACCEPT_LANGUAGE,
    header::CACHE_CONTROL,
    header::CONNECTION,
    header::COOKIE,
    header::HOST,
    header::REFERER,
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::AUTHORIZATION,
];

/// Origin response headers never echoed to the caller.
pub static EXCLUDED_RESPONSE_HEADERS: [HeaderName; 4] = [
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Headers appended to every relayed response.
pub static CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_METHODS,
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Authorization",
    ),
];

/// Build the outbound header set from the caller's headers.
///
/// Takes the first non-empty value of each allow-listed header, in
/// allow-list order. Absent headers are simply omitted.
pub fn filter_inbound(headers: &HeaderList) -> HeaderList {
    FORWARDED_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(name.as_str())
                .filter(|value| !value.is_empty())
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}

/// Build the caller-facing header set from the origin's headers.
pub fn filter_outbound(headers: &HeaderList) -> HeaderList {
    let mut filtered: HeaderList = headers
        .iter()
        .filter(|(name, _)| !is_excluded(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for (name, value) in &CORS_HEADERS {
        filtered.push(name.clone(), HeaderValue::from_static(*value));
    }
    filtered
}

fn is_excluded(name: &HeaderName) -> bool {
    EXCLUDED_RESPONSE_HEADERS
        .iter()
        .any(|excluded| excluded.as_str().eq_ignore_ascii_case(name.as_str()))
}
