//! Per-segment listing acquisition with optional pagination.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::AcquireConfig;
use crate::domain::{Segment, TickerRecord};
use crate::error::FetchError;
use crate::rate_limit::{endpoint_key, RateLimiter};
use crate::table::{first_table, ListingTable};
use crate::transport::{HttpRequest, HttpTransport};

/// One scraped listing location.
#[derive(Debug, Clone)]
pub struct SegmentSource {
    pub segment: Segment,
    /// Absolute listing URL; paginated sources embed `{offset}` and
    /// `{count}` placeholders.
    pub url: String,
    pub paginated: bool,
    /// Candidate headers naming the symbol column.
    pub symbol_columns: Vec<String>,
    /// Candidate headers naming the display-name column.
    pub name_columns: Vec<String>,
}

impl SegmentSource {
    pub fn simple(segment: Segment, url: impl Into<String>) -> Self {
        Self {
            segment,
            url: url.into(),
            paginated: false,
            symbol_columns: symbol_candidates(),
            name_columns: name_candidates(),
        }
    }

    pub fn paginated(segment: Segment, url: impl Into<String>) -> Self {
        Self {
            paginated: true,
            ..Self::simple(segment, url)
        }
    }
}

fn symbol_candidates() -> Vec<String> {
    vec![String::from("Symbol"), String::from("Ticker")]
}

fn name_candidates() -> Vec<String> {
    vec![
        String::from("Name"),
        String::from("Company Name"),
        String::from("Fund Name"),
        String::from("Company"),
    ]
}

/// The built-in scraped-segment catalog, in universe order.
pub fn default_sources(listing_base: &str) -> Vec<SegmentSource> {
    let base = listing_base.trim_end_matches('/');
    vec![
        SegmentSource::paginated(
            Segment::Stock,
            format!("{base}/screener/stocks/?offset={{offset}}&count={{count}}"),
        ),
        SegmentSource::simple(Segment::Crypto, format!("{base}/markets/crypto/")),
        SegmentSource::simple(Segment::Forex, format!("{base}/markets/currencies/")),
        SegmentSource::paginated(
            Segment::Etf,
            format!("{base}/screener/etfs/?offset={{offset}}&count={{count}}"),
        ),
        SegmentSource::simple(
            Segment::MutualFund,
            format!("{base}/screener/mutual-funds/"),
        ),
        SegmentSource::simple(Segment::Futures, format!("{base}/markets/futures/")),
    ]
}

/// Fetches one segment listing at a time through the shared limiter.
///
/// A source is resolved to validated [`TickerRecord`]s: the symbol
/// column becomes `ticker`, the name column becomes `name`, blank and
/// repeated symbols are dropped. Paginated sources walk an offset loop
/// carrying a seen-set across pages; the loop stops on the first page
/// with no table, no usable columns, no fresh rows, or fewer rows than
/// `page_size`, and never walks past `max_pages`.
pub struct SegmentFetcher {
    transport: Arc<dyn HttpTransport>,
    rate: RateLimiter,
    page_size: u32,
    max_pages: u32,
    request_timeout_ms: u64,
}

impl SegmentFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        rate: RateLimiter,
        config: &AcquireConfig,
    ) -> Self {
        Self {
            transport,
            rate,
            page_size: config.page_size,
            max_pages: config.max_pages,
            request_timeout_ms: config.request_timeout_ms,
        }
    }

    /// Resolve one source to its ticker records.
    pub async fn fetch(&self, source: &SegmentSource) -> Result<Vec<TickerRecord>, FetchError> {
        if source.paginated {
            self.fetch_paginated(source).await
        } else {
            self.fetch_single(source).await
        }
    }

    async fn fetch_single(&self, source: &SegmentSource) -> Result<Vec<TickerRecord>, FetchError> {
        let Some(table) = self.fetch_table(source, &source.url).await? else {
            debug!(segment = %source.segment, "listing page has no table");
            return Ok(Vec::new());
        };

        let Some(symbol) = table.column(&source.symbol_columns) else {
            return Err(FetchError::missing_columns(
                source.segment.as_str(),
                &source.symbol_columns,
            ));
        };
        let Some(name) = table.column(&source.name_columns) else {
            return Err(FetchError::missing_columns(
                source.segment.as_str(),
                &source.name_columns,
            ));
        };

        let mut seen = HashSet::new();
        Ok(collect_rows(source, &table, (symbol, name), &mut seen))
    }

    /// Offset loop; a malformed later page ends the loop instead of
    /// failing the fetch, and a malformed first page simply yields an
    /// empty result for the retry layer to classify.
    async fn fetch_paginated(
        &self,
        source: &SegmentSource,
    ) -> Result<Vec<TickerRecord>, FetchError> {
        let mut records = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 0..self.max_pages {
            let url = self.page_url(source, page * self.page_size);
            let Some(table) = self.fetch_table(source, &url).await? else {
                debug!(segment = %source.segment, page, "pagination stopped: no table");
                break;
            };
            let Some(columns) = locate_columns(source, &table) else {
                debug!(
                    segment = %source.segment,
                    page, "pagination stopped: required columns missing"
                );
                break;
            };

            let fresh = collect_rows(source, &table, columns, &mut seen);
            if fresh.is_empty() {
                debug!(segment = %source.segment, page, "pagination stopped: no fresh rows");
                break;
            }

            let short_page = (table.rows.len() as u32) < self.page_size;
            records.extend(fresh);
            if short_page {
                debug!(segment = %source.segment, page, "pagination stopped: short page");
                break;
            }
        }

        Ok(records)
    }

    /// GET one listing page and parse its first table.
    async fn fetch_table(
        &self,
        source: &SegmentSource,
        url: &str,
    ) -> Result<Option<ListingTable>, FetchError> {
        self.rate.wait_if_needed(endpoint_key(url)).await;

        let request = HttpRequest::get(url).with_timeout_ms(self.request_timeout_ms);
        let response = self.transport.execute(request).await.map_err(|e| {
            FetchError::transport(format!(
                "listing fetch for segment '{}' failed: {}",
                source.segment,
                e.message()
            ))
        })?;
        if !response.is_success() {
            return Err(FetchError::upstream(response.status, url));
        }

        Ok(first_table(&response.body))
    }

    fn page_url(&self, source: &SegmentSource, offset: u32) -> String {
        source
            .url
            .replace("{offset}", &offset.to_string())
            .replace("{count}", &self.page_size.to_string())
    }
}

fn locate_columns(source: &SegmentSource, table: &ListingTable) -> Option<(usize, usize)> {
    let symbol = table.column(&source.symbol_columns)?;
    let name = table.column(&source.name_columns)?;
    Some((symbol, name))
}

/// Table rows as validated records, skipping blank symbols, symbols
/// the running set already holds, and rows that fail validation.
fn collect_rows(
    source: &SegmentSource,
    table: &ListingTable,
    (symbol, name): (usize, usize),
    seen: &mut HashSet<String>,
) -> Vec<TickerRecord> {
    let mut fresh = Vec::new();
    for row in &table.rows {
        let ticker = table.cell(row, symbol);
        if ticker.is_empty() || seen.contains(ticker) {
            continue;
        }
        let display = table.cell(row, name);
        let display = (!display.is_empty()).then(|| display.to_string());
        match TickerRecord::new(ticker, display, source.segment) {
            Ok(record) => {
                seen.insert(record.ticker.clone());
                fresh.push(record);
            }
            Err(error) => {
                debug!(
                    segment = %source.segment,
                    ticker, %error, "dropping unusable listing row"
                );
            }
        }
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use crate::transport::ScriptedTransport;
    use std::time::Duration;

    fn listing_html(rows: &[(&str, &str)]) -> String {
        let mut html =
            String::from("<table><tr><th>Symbol</th><th>Name</th><th>Price</th></tr>");
        for (symbol, name) in rows {
            html.push_str(&format!(
                "<tr><td>{symbol}</td><td>{name}</td><td>1.00</td></tr>"
            ));
        }
        html.push_str("</table>");
        html
    }

    fn fetcher(transport: Arc<ScriptedTransport>, config: &AcquireConfig) -> SegmentFetcher {
        SegmentFetcher::new(transport, RateLimiter::new(Duration::ZERO), config)
    }

    #[test]
    fn catalog_covers_scraped_segments_in_order() {
        let sources = default_sources("https://listings.test");

        let segments: Vec<Segment> = sources.iter().map(|s| s.segment).collect();
        assert_eq!(segments, Segment::SCRAPED.to_vec());
        assert!(sources[0].paginated);
        assert!(sources[0].url.contains("{offset}"));
        assert!(!sources[1].paginated);
    }

    #[tokio::test]
    async fn single_page_maps_columns_and_dedups() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(listing_html(&[
            ("AAPL", "Apple Inc."),
            ("MSFT", "Microsoft Corporation"),
            ("AAPL", "Apple Inc. duplicate"),
            ("", "Blank Symbol Co."),
        ]));

        let config = AcquireConfig::offline();
        let source = SegmentSource::simple(Segment::Stock, "https://listings.test/stocks/");
        let records = fetcher(transport, &config)
            .fetch(&source)
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].name.as_deref(), Some("Apple Inc."));
        assert_eq!(records[0].segment, Segment::Stock);
        assert_eq!(records[1].ticker, "MSFT");
    }

    #[tokio::test]
    async fn missing_required_columns_is_not_retryable() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(
            "<table><tr><th>Code</th><th>Price</th></tr>\
             <tr><td>AAPL</td><td>1.00</td></tr></table>",
        );

        let config = AcquireConfig::offline();
        let source = SegmentSource::simple(Segment::Stock, "https://listings.test/stocks/");
        let error = fetcher(transport, &config)
            .fetch(&source)
            .await
            .expect_err("structural mismatch");

        assert_eq!(error.kind(), FetchErrorKind::MissingColumns);
        assert!(!error.retryable());
    }

    #[tokio::test]
    async fn page_without_table_yields_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok("<html><body><p>maintenance window</p></body></html>");

        let config = AcquireConfig::offline();
        let source = SegmentSource::simple(Segment::Forex, "https://listings.test/currencies/");
        let records = fetcher(transport, &config)
            .fetch(&source)
            .await
            .expect("empty, not an error");

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn upstream_status_errors_are_retryable() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(503, "service unavailable");

        let config = AcquireConfig::offline();
        let source = SegmentSource::simple(Segment::Crypto, "https://listings.test/crypto/");
        let error = fetcher(transport, &config)
            .fetch(&source)
            .await
            .expect_err("upstream failure");

        assert_eq!(error.kind(), FetchErrorKind::Upstream);
        assert!(error.retryable());
    }

    #[tokio::test]
    async fn pagination_stops_on_short_page() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(listing_html(&[("AAA", "First"), ("BBB", "Second")]));
        transport.push_ok(listing_html(&[("CCC", "Third")]));

        let mut config = AcquireConfig::offline();
        config.page_size = 2;
        let source = SegmentSource::paginated(
            Segment::Stock,
            "https://listings.test/screener/stocks/?offset={offset}&count={count}",
        );

        let records = fetcher(transport.clone(), &config)
            .fetch(&source)
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 3);
        assert_eq!(transport.request_count(), 2);
        let urls: Vec<String> = transport.requests().iter().map(|r| r.url.clone()).collect();
        assert!(urls[0].contains("offset=0&count=2"));
        assert!(urls[1].contains("offset=2&count=2"));
    }

    #[tokio::test]
    async fn pagination_stops_when_a_page_repeats_known_symbols() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(listing_html(&[("AAA", "First"), ("BBB", "Second")]));
        transport.push_ok(listing_html(&[("BBB", "Second"), ("AAA", "First")]));

        let mut config = AcquireConfig::offline();
        config.page_size = 2;
        let source = SegmentSource::paginated(
            Segment::Etf,
            "https://listings.test/screener/etfs/?offset={offset}&count={count}",
        );

        let records = fetcher(transport.clone(), &config)
            .fetch(&source)
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 2);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn pagination_never_exceeds_max_pages() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(listing_html(&[("AAA", "1"), ("BBB", "2")]));
        transport.push_ok(listing_html(&[("CCC", "3"), ("DDD", "4")]));
        transport.push_ok(listing_html(&[("EEE", "5"), ("FFF", "6")]));

        let mut config = AcquireConfig::offline();
        config.page_size = 2;
        config.max_pages = 3;
        let source = SegmentSource::paginated(
            Segment::Stock,
            "https://listings.test/screener/stocks/?offset={offset}&count={count}",
        );

        let records = fetcher(transport.clone(), &config)
            .fetch(&source)
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 6);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn later_malformed_page_keeps_earlier_rows() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(listing_html(&[("AAA", "First"), ("BBB", "Second")]));
        transport.push_ok("<html><body>no table here</body></html>");

        let mut config = AcquireConfig::offline();
        config.page_size = 2;
        let source = SegmentSource::paginated(
            Segment::Stock,
            "https://listings.test/screener/stocks/?offset={offset}&count={count}",
        );

        let records = fetcher(transport, &config)
            .fetch(&source)
            .await
            .expect("partial result");

        assert_eq!(records.len(), 2);
    }
}
