use std::time::Duration;

use crate::retry::RetryConfig;
use crate::session::SessionConfig;

/// Tunables for a universe build.
///
/// Defaults match the production pacing the upstreams tolerate; the
/// base URLs exist so tests and mock mode can point every fetch at a
/// scripted transport without touching the fetch logic.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Minimum spacing between calls under one rate-limiter key.
    pub min_delay: Duration,
    pub retry: RetryConfig,
    /// Rows requested per page in paginated listings.
    pub page_size: u32,
    /// Hard ceiling on pages walked per segment.
    pub max_pages: u32,
    pub request_timeout_ms: u64,
    /// Base of the listing-page endpoints (segment tables).
    pub listing_base_url: String,
    /// Base of the authenticated document endpoints.
    pub document_base_url: String,
    pub session: SessionConfig,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(1_200),
            retry: RetryConfig::default(),
            page_size: 200,
            max_pages: 100,
            request_timeout_ms: 10_000,
            listing_base_url: String::from("https://stockanalysis.com"),
            document_base_url: String::from("https://query1.finance.yahoo.com"),
            session: SessionConfig::default(),
        }
    }
}

impl AcquireConfig {
    /// Deterministic profile for mock mode and offline tests: no
    /// pacing, one attempt, no refresh cooldown.
    pub fn offline() -> Self {
        Self {
            min_delay: Duration::ZERO,
            retry: RetryConfig::no_retry(),
            session: SessionConfig {
                cooldown: Duration::ZERO,
                ..SessionConfig::default()
            },
            ..Self::default()
        }
    }
}
