//! Per-ticker document rows from the authenticated upstream.
//!
//! Fetches the SEC-filing module of the quote-summary endpoint and
//! flattens it into ingestion-ready rows: snake_case keys, empty
//! markers nulled, the ticker and extraction time stamped in.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::clean::{normalize_empty, snake_case_key};
use crate::config::AcquireConfig;
use crate::error::FetchError;
use crate::rate_limit::{endpoint_key, RateLimiter};
use crate::retry::{Outcome, RetryPolicy};
use crate::session::{CrumbSession, REFERER};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// One flattened document row.
pub type DocumentRow = Map<String, Value>;

/// Authenticated client for per-ticker document rows.
///
/// Every fetch runs through the shared rate limiter, the session's
/// single-shot refresh, and the retry policy, in that nesting order:
/// the retried unit of work includes the rate wait, and a refresh
/// inside one attempt does not count against the retry budget.
pub struct DocumentClient {
    session: Arc<CrumbSession>,
    rate: RateLimiter,
    retry: RetryPolicy,
    base_url: String,
    request_timeout_ms: u64,
}

impl DocumentClient {
    /// Client over a fixed transport; session rebuilds reuse it.
    /// Serves tests and mock mode.
    pub fn new(transport: Arc<dyn HttpTransport>, config: &AcquireConfig) -> Self {
        let session = Arc::new(CrumbSession::with_transport(
            config.session.clone(),
            transport,
        ));
        Self::with_session(session, RateLimiter::new(config.min_delay), config)
    }

    /// Production client: session rebuilds construct a brand-new
    /// network transport, dropping any poisoned cookie state.
    pub fn over_network(config: &AcquireConfig) -> Self {
        let session = Arc::new(CrumbSession::new(
            config.session.clone(),
            Arc::new(|| Arc::new(ReqwestTransport::new()) as Arc<dyn HttpTransport>),
        ));
        Self::with_session(session, RateLimiter::new(config.min_delay), config)
    }

    /// Client over an explicit session and limiter shared with other
    /// fetchers.
    pub fn with_session(
        session: Arc<CrumbSession>,
        rate: RateLimiter,
        config: &AcquireConfig,
    ) -> Self {
        Self {
            session,
            rate,
            retry: RetryPolicy::new(config.retry.clone()),
            base_url: config.document_base_url.trim_end_matches('/').to_string(),
            request_timeout_ms: config.request_timeout_ms,
        }
    }

    /// All filing rows published for one ticker.
    ///
    /// Degrades to an empty list when the retry budget runs out; only
    /// a permanent classification surfaces as an error.
    pub async fn fetch_filings(&self, ticker: &str) -> Result<Vec<DocumentRow>, FetchError> {
        let symbol = ticker.trim().to_uppercase();
        let operation = format!("sec_filings:{symbol}");

        self.retry
            .run(&operation, Vec::new(), || async {
                Outcome::from_result(self.fetch_once(&symbol).await, Vec::is_empty)
            })
            .await
    }

    async fn fetch_once(&self, symbol: &str) -> Result<Vec<DocumentRow>, FetchError> {
        self.rate.wait_if_needed(endpoint_key(&self.base_url)).await;

        let base = self.base_url.clone();
        let symbol_owned = symbol.to_string();
        let timeout = self.request_timeout_ms;

        self.session
            .with_refresh(move |transport, auth| {
                let url = format!(
                    "{base}/v10/finance/quoteSummary/{}?modules=secFilings&crumb={}",
                    urlencoding::encode(&symbol_owned),
                    urlencoding::encode(&auth.crumb)
                );
                let request = HttpRequest::get(&url)
                    .with_header("cookie", auth.cookie.clone())
                    .with_header("referer", REFERER)
                    .with_timeout_ms(timeout);
                let symbol = symbol_owned.clone();
                Box::pin(async move {
                    let response = transport.execute(request).await.map_err(|e| {
                        FetchError::transport(format!(
                            "document fetch for {symbol} failed: {}",
                            e.message()
                        ))
                    })?;
                    decode_filings(&symbol, &url, &response)
                })
            })
            .await
    }
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "secFilings", default)]
    sec_filings: Option<SecFilingsModule>,
}

#[derive(Debug, Deserialize)]
struct SecFilingsModule {
    #[serde(default)]
    filings: Vec<Map<String, Value>>,
}

/// The upstream signals a dead session inside an otherwise
/// normal-looking response; check the payload, not just the status.
fn is_auth_rejection(response: &HttpResponse) -> bool {
    response.status == 401
        || response.body.contains("Invalid Crumb")
        || response.body.contains("Invalid Cookie")
}

fn decode_filings(
    symbol: &str,
    url: &str,
    response: &HttpResponse,
) -> Result<Vec<DocumentRow>, FetchError> {
    if is_auth_rejection(response) {
        return Err(FetchError::auth_expired(format!(
            "document endpoint rejected the session for {symbol}"
        )));
    }
    if !response.is_success() {
        return Err(FetchError::upstream(response.status, url));
    }

    let envelope: QuoteSummaryEnvelope = serde_json::from_str(&response.body).map_err(|e| {
        FetchError::decode(format!("malformed document payload for {symbol}: {e}"))
    })?;

    if let Some(error) = envelope.quote_summary.error {
        debug!(symbol, %error, "document api reported an error, treating as empty");
        return Ok(Vec::new());
    }

    let module = envelope
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.sec_filings);
    let Some(module) = module else {
        return Ok(Vec::new());
    };

    let extracted_at = extraction_timestamp();
    Ok(module
        .filings
        .into_iter()
        .map(|filing| shape_row(symbol, &extracted_at, filing))
        .collect())
}

/// One filing as a flat row. Stamped fields win over any upstream key
/// that normalizes to the same name.
fn shape_row(symbol: &str, extracted_at: &str, filing: Map<String, Value>) -> DocumentRow {
    let mut row = Map::with_capacity(filing.len() + 2);
    for (key, value) in filing {
        row.insert(snake_case_key(&key), normalize_empty(value));
    }
    row.insert(String::from("ticker"), Value::String(symbol.to_string()));
    row.insert(
        String::from("extracted_at"),
        Value::String(extracted_at.to_string()),
    );
    row
}

fn extraction_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
