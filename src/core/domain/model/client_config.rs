//! Client-wide configuration: API version, rate limiting, polling and
//! per-operation deadlines.

use std::time::Duration;

/// The network API version every request is pinned to.
pub const DEFAULT_API_VERSION: &str = "2020-05-01";

/// Client-side rate limiting of outgoing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Sustained requests per second.
    pub requests_per_second: u32,
    /// Requests allowed in a single burst.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 20,
        }
    }
}

/// Deadlines for each kind of resource operation.
///
/// Exceeding a deadline abandons the local wait; the remote operation is not cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

/// Configuration shared by the HTTP client and the resource.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `api-version` query parameter sent with every network request.
    pub api_version: String,
    /// Optional client-side rate limit; `None` disables it.
    pub rate_limit: Option<RateLimitConfig>,
    /// Tokens are refreshed when they expire within this margin.
    pub token_refresh_margin: Duration,
    /// Delay between polls of a long-running operation when the service sends no `Retry-After`.
    pub poll_interval: Duration,
    /// Per-operation deadlines.
    pub timeouts: ResourceTimeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            rate_limit: None,
            token_refresh_margin: Duration::from_secs(5 * 60),
            poll_interval: Duration::from_secs(10),
            timeouts: ResourceTimeouts::default(),
        }
    }
}
