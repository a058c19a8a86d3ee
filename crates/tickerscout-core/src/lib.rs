//! # Tickerscout Core
//!
//! Resilient ticker-universe acquisition for the tickerscout toolkit.
//!
//! ## Overview
//!
//! This crate builds a deduplicated universe of ticker symbols from
//! flaky upstream sources, and fetches per-ticker document rows from
//! an authenticated endpoint. It provides:
//!
//! - **Validated domain records** for tickers and their market segments
//! - **Per-key rate limiting** so every upstream sees paced traffic
//! - **Bounded retry** with exponential backoff, jitter, and a
//!   degrade-to-empty contract on exhaustion
//! - **Session management** for the upstream's cookie/crumb scheme,
//!   with a single-shot refresh when a session dies mid-flight
//! - **Listing-page scraping** with pagination and end-of-data detection
//! - **Segment caching** shared across fetchers for the life of a run
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Per-segment ticker cache |
//! | [`clean`] | Key normalization and empty-value cleanup |
//! | [`config`] | Acquisition tunables |
//! | [`curated`] | Static catalog for segments no listing covers |
//! | [`documents`] | Authenticated per-ticker document rows |
//! | [`domain`] | Ticker records and segment classification |
//! | [`error`] | Error types |
//! | [`rate_limit`] | Per-key minimum-delay spacing |
//! | [`retry`] | Outcome classification and bounded retry |
//! | [`segments`] | Listing-page fetch with pagination |
//! | [`session`] | Cookie/crumb session with single-shot refresh |
//! | [`table`] | First-table extraction from HTML |
//! | [`transport`] | HTTP transport abstraction |
//! | [`universe`] | Fan-out, fusion, and dedup orchestration |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerscout_core::{AcquireConfig, ReqwestTransport, TickerCache, TickerFetcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AcquireConfig::default();
//!     let transport = Arc::new(ReqwestTransport::new());
//!     let fetcher = TickerFetcher::new(transport, TickerCache::new(), &config);
//!
//!     let build = fetcher.fetch_all().await;
//!     println!("{} tickers, {} degraded sources",
//!         build.records.len(), build.failures.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ TickerFetcher  │── per-segment fault isolation, fusion, dedup
//! └───────┬────────┘
//!         │
//!         ▼
//! ┌────────────────┐    ┌───────────────┐
//! │  TickerCache   │───▶│  RetryPolicy  │── backoff + degrade-to-empty
//! └────────────────┘    └───────┬───────┘
//!                               │
//!                               ▼
//! ┌────────────────┐    ┌───────────────┐
//! │  RateLimiter   │◀───│ SegmentFetcher│── pagination + table parse
//! └────────────────┘    └───────┬───────┘
//!                               │
//!                               ▼
//!                       ┌───────────────┐
//!                       │ HttpTransport │── reqwest / scripted
//!                       └───────────────┘
//! ```
//!
//! Document fetches follow the same path with [`session::CrumbSession`]
//! inserted above the transport: an auth rejection inside one attempt
//! triggers one session rebuild before the retry policy ever sees it.
//!
//! ## Error Handling
//!
//! Fetch errors carry a classification the retry layer acts on:
//!
//! ```rust
//! use tickerscout_core::{FetchError, FetchErrorKind};
//!
//! fn handle_error(error: FetchError) {
//!     match error.kind() {
//!         FetchErrorKind::AuthExpired => {
//!             // Session refresh, then retry
//!         }
//!         FetchErrorKind::MissingColumns | FetchErrorKind::UnknownSegment => {
//!             // Structural mismatch, do not retry
//!         }
//!         _ => {
//!             // Everything else is treated as transient
//!         }
//!     }
//! }
//! ```

pub mod cache;
pub mod clean;
pub mod config;
pub mod curated;
pub mod documents;
pub mod domain;
pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod segments;
pub mod session;
pub mod table;
pub mod transport;
pub mod universe;

// Re-export commonly used types at crate root for convenience

// Configuration
pub use config::AcquireConfig;

// Domain models
pub use domain::{Segment, TickerRecord, MAX_TICKER_LEN};

// Error types
pub use error::{FetchError, FetchErrorKind, ValidationError};

// Acquisition building blocks
pub use cache::TickerCache;
pub use rate_limit::RateLimiter;
pub use retry::{Backoff, Outcome, RetryConfig, RetryPolicy};
pub use session::{CrumbSession, SessionAuth, SessionConfig, TransportFactory};

// Fetchers
pub use documents::{DocumentClient, DocumentRow};
pub use segments::{default_sources, SegmentFetcher, SegmentSource};
pub use universe::{SourceFailure, TickerFetcher, UniverseBuild};

// Transport
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, NoopTransport, ReqwestTransport, ScriptedTransport,
    TransportError,
};
