//! Target origin resolution.
//!
//! # Responsibilities
//! - Accept absolute-form targets (`GET http://origin/path`) verbatim
//! - Accept absolute URLs embedded in the path (`GET /http://origin/path`)
//! - Otherwise synthesize `{scheme}://{Host}{path}` from the Host header
//! - Reject requests whose only addressable origin is the proxy itself
//!
//! # Design Decisions
//! - Authorities are compared after URL normalisation: `127.1`, `0x7f.1`
//!   and `[::ffff:127.0.0.1]` are all `127.0.0.1`, and a missing port is
//!   the scheme default
//! - Loopback and unspecified binds answer to every loopback address
//! - Every resolved target is checked against the identity, whichever
//!   path produced it

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use url::{Host, Url};

use crate::error::ProxyError;
use crate::http::request::InboundRequest;

/// Normalised `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Authority {
    host: Host<String>,
    port: u16,
}

impl Authority {
    /// Parse a Host-header style authority; a missing port is `scheme`'s default.
    fn parse(raw: &str, scheme: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let url = Url::parse(&format!("{scheme}://{raw}/")).ok()?;
        Self::from_url(&url)
    }

    fn from_url(url: &Url) -> Option<Self> {
        let port = url.port_or_known_default()?;
        let host = match url.host()? {
            Host::Domain(domain) => Host::Domain(domain.trim_end_matches('.').to_ascii_lowercase()),
            Host::Ipv4(ip) => Host::Ipv4(ip),
            Host::Ipv6(ip) => match ip.to_ipv4_mapped() {
                Some(v4) => Host::Ipv4(v4),
                None => Host::Ipv6(ip),
            },
        };
        Some(Self { host, port })
    }

    fn is_local(&self) -> bool {
        match &self.host {
            Host::Domain(domain) => domain == "localhost",
            Host::Ipv4(ip) => ip.is_loopback() || ip.is_unspecified(),
            Host::Ipv6(ip) => ip.is_loopback() || ip.is_unspecified(),
        }
    }
}

/// The authorities under which the proxy reaches itself.
#[derive(Debug, Clone, Default)]
pub struct ProxyIdentity {
    authorities: Vec<Authority>,
    /// Port on which any loopback address is the proxy.
    local_port: Option<u16>,
}

impl ProxyIdentity {
    /// Identity from an explicit list of `host[:port]` authorities.
    pub fn new<I, S>(authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut identity = Self::default();
        for authority in authorities {
            identity.add(authority.as_ref());
        }
        identity
    }

    /// Identity of a proxy bound to `addr`, optionally advertised as `public_host`.
    pub fn from_local_addr(addr: SocketAddr, public_host: Option<&str>) -> Self {
        let mut identity = Self::default();
        let host = match addr.ip() {
            IpAddr::V4(ip) => Host::Ipv4(ip),
            IpAddr::V6(ip) => match ip.to_ipv4_mapped() {
                Some(v4) => Host::Ipv4(v4),
                None => Host::Ipv6(ip),
            },
        };
        identity.authorities.push(Authority {
            host,
            port: addr.port(),
        });
        if addr.ip().is_loopback() || addr.ip().is_unspecified() {
            identity.local_port = Some(addr.port());
        }
        if let Some(public_host) = public_host {
            identity.add(public_host);
        }
        identity
    }

    fn add(&mut self, raw: &str) {
        if let Some(authority) = Authority::parse(raw, "http") {
            if !self.authorities.contains(&authority) {
                self.authorities.push(authority);
            }
        }
    }

    fn contains(&self, authority: &Authority) -> bool {
        (self.local_port == Some(authority.port) && authority.is_local())
            || self.authorities.contains(authority)
    }

    /// Returns true if the Host-style `authority` names the proxy itself.
    pub fn is_self(&self, authority: &str) -> bool {
        Authority::parse(authority, "http").is_some_and(|a| self.contains(&a))
    }

    /// Returns true if `url` points back at the proxy.
    pub fn is_self_url(&self, url: &Url) -> bool {
        Authority::from_url(url).is_some_and(|a| self.contains(&a))
    }
}

/// Absolute http(s) URL a request is forwarded to.
///
/// Keeps the text it was resolved from; `as_url` is the normalised form
/// the request is actually sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    raw: String,
    url: Url,
}

impl TargetUrl {
    /// Parse `raw`, rejecting anything that is not an http(s) URL with a host.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let url = Url::parse(raw).map_err(|_| ProxyError::invalid_target(raw))?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(Self {
                raw: raw.to_string(),
                url,
            }),
            _ => Err(ProxyError::invalid_target(raw)),
        }
    }

    /// The target as resolved, before normalisation.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// `host[:port]` for the Host header; the port is omitted when it is
    /// the scheme default.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Host header value naming this target.
    pub fn host_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.authority()).ok()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decides where an inbound request should be forwarded.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    identity: ProxyIdentity,
}

impl TargetResolver {
    pub fn new(identity: ProxyIdentity) -> Self {
        Self { identity }
    }

    /// Resolve the origin URL for `request`.
    pub fn resolve(&self, request: &InboundRequest) -> Result<TargetUrl, ProxyError> {
        let candidate = self.candidate(request);

        let target = if has_http_scheme(&candidate) {
            TargetUrl::parse(&candidate)?
        } else if let Some(embedded) = candidate.strip_prefix('/').filter(|rest| has_http_scheme(rest)) {
            TargetUrl::parse(embedded)?
        } else {
            match request.host() {
                Some(host) if !self.identity.is_self(host) => {
                    let scheme = if request.secure { "https" } else { "http" };
                    TargetUrl::parse(&format!("{scheme}://{host}{candidate}"))?
                }
                _ => return Err(ProxyError::invalid_target(candidate)),
            }
        };

        if self.identity.is_self_url(target.as_url()) {
            return Err(ProxyError::invalid_target(candidate));
        }
        Ok(target)
    }

    /// The received URL with the proxy's own `scheme://host` prefix removed.
    fn candidate(&self, request: &InboundRequest) -> String {
        let uri = &request.uri;
        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

        if uri.scheme().is_none() || uri.authority().is_none() {
            return path_and_query.to_string();
        }
        let absolute = uri.to_string();
        match Url::parse(&absolute) {
            Ok(url) if self.identity.is_self_url(&url) => path_and_query.to_string(),
            _ => absolute,
        }
    }
}

fn has_http_scheme(candidate: &str) -> bool {
    let lower = candidate.get(..8).unwrap_or(candidate).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
