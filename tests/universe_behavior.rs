//! Behavior-driven tests for universe building.
//!
//! These tests verify WHAT a caller observes when assembling the ticker
//! universe: pagination termination, warm-cache rebuilds, per-source
//! fault isolation, fusion order, and ad-hoc symbol classification.

use std::sync::Arc;

use tickerscout_core::curated::registry;
use tickerscout_core::{
    AcquireConfig, HttpResponse, ScriptedTransport, Segment, SegmentSource, TickerCache,
    TickerFetcher,
};

fn listing_page(rows: &[(&str, &str)]) -> String {
    let mut body =
        String::from("<table><thead><tr><th>Symbol</th><th>Name</th></tr></thead><tbody>");
    for (symbol, name) in rows {
        body.push_str(&format!("<tr><td>{symbol}</td><td>{name}</td></tr>"));
    }
    body.push_str("</tbody></table>");
    body
}

fn stock_source() -> SegmentSource {
    SegmentSource::paginated(
        Segment::Stock,
        String::from("https://listing.test/screener/stocks/?offset={offset}&count={count}"),
    )
}

fn crypto_source() -> SegmentSource {
    SegmentSource::simple(
        Segment::Crypto,
        String::from("https://listing.test/markets/crypto/"),
    )
}

fn paginated_config(page_size: u32) -> AcquireConfig {
    let mut config = AcquireConfig::offline();
    config.page_size = page_size;
    config
}

// =============================================================================
// Pagination: Termination Without Duplicates
// =============================================================================

#[tokio::test]
async fn when_a_listing_spans_pages_the_walk_stops_at_the_first_short_page() {
    // Given: two full pages followed by a short one
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_ok(listing_page(&[("AAA", "Alpha"), ("BBB", "Beta")]));
    transport.push_ok(listing_page(&[("CCC", "Gamma"), ("DDD", "Delta")]));
    transport.push_ok(listing_page(&[("EEE", "Epsilon")]));

    let fetcher = TickerFetcher::new(transport.clone(), TickerCache::new(), &paginated_config(2))
        .with_sources(vec![stock_source()])
        .with_curated(Vec::new());

    // When: the universe is built
    let build = fetcher.fetch_all().await;

    // Then: all three pages landed in order and the walk made exactly three requests
    assert!(build.failures.is_empty());
    let tickers: Vec<&str> = build
        .records
        .iter()
        .map(|record| record.ticker.as_str())
        .collect();
    assert_eq!(tickers, vec!["AAA", "BBB", "CCC", "DDD", "EEE"]);
    assert_eq!(transport.request_count(), 3);

    // And: each request advanced the offset by the page size
    let urls: Vec<String> = transport
        .requests()
        .iter()
        .map(|request| request.url.clone())
        .collect();
    assert!(urls[0].contains("offset=0&count=2"));
    assert!(urls[1].contains("offset=2&count=2"));
    assert!(urls[2].contains("offset=4&count=2"));
}

#[tokio::test]
async fn when_the_upstream_repeats_a_page_the_walk_terminates() {
    // Given: the same full page served for every offset
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(
        "/screener/stocks/",
        HttpResponse::ok(listing_page(&[("AAA", "Alpha"), ("BBB", "Beta")])),
    );

    let fetcher = TickerFetcher::new(transport.clone(), TickerCache::new(), &paginated_config(2))
        .with_sources(vec![stock_source()])
        .with_curated(Vec::new());

    let build = fetcher.fetch_all().await;

    // Then: the second page contributed nothing new, so the walk stopped
    assert_eq!(build.records.len(), 2);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn when_pages_never_shrink_the_page_cap_bounds_the_walk() {
    // Given: more full single-row pages than the cap allows
    let transport = Arc::new(ScriptedTransport::new());
    for index in 0..5 {
        transport.push_ok(listing_page(&[(format!("TK{index}").as_str(), "Ticker")]));
    }

    let mut config = paginated_config(1);
    config.max_pages = 3;
    let fetcher = TickerFetcher::new(transport.clone(), TickerCache::new(), &config)
        .with_sources(vec![stock_source()])
        .with_curated(Vec::new());

    let build = fetcher.fetch_all().await;

    // Then: the cap stopped the walk with the pages seen so far
    assert_eq!(build.records.len(), 3);
    assert_eq!(transport.request_count(), 3);
}

// =============================================================================
// Cache: Rebuilds Without The Network
// =============================================================================

#[tokio::test]
async fn when_the_universe_is_rebuilt_the_cache_answers_without_the_network() {
    // Given: one healthy source behind a counting transport
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(
        "/markets/crypto/",
        HttpResponse::ok(listing_page(&[("BTC-USD", "Bitcoin USD")])),
    );

    let fetcher = TickerFetcher::new(
        transport.clone(),
        TickerCache::new(),
        &AcquireConfig::offline(),
    )
    .with_sources(vec![crypto_source()])
    .with_curated(Vec::new());

    // When: the universe is built twice
    let first = fetcher.fetch_all().await;
    let requests_after_first = transport.request_count();
    let second = fetcher.fetch_all().await;

    // Then: the rebuild made no further requests and returned the same records
    assert_eq!(requests_after_first, 1);
    assert_eq!(transport.request_count(), requests_after_first);
    assert_eq!(first.records, second.records);
}

// =============================================================================
// Fault Isolation And Fusion Order
// =============================================================================

#[tokio::test]
async fn when_one_source_is_malformed_the_others_still_deliver() {
    // Given: a stock listing without a symbol column next to a healthy crypto listing
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(
        "/markets/stocks-live/",
        HttpResponse::ok(
            "<table><thead><tr><th>Company</th></tr></thead>\
             <tbody><tr><td>Apple</td></tr></tbody></table>",
        ),
    );
    transport.route(
        "/markets/crypto/",
        HttpResponse::ok(listing_page(&[("BTC-USD", "Bitcoin USD")])),
    );

    let fetcher = TickerFetcher::new(transport, TickerCache::new(), &AcquireConfig::offline())
        .with_sources(vec![
            SegmentSource::simple(
                Segment::Stock,
                String::from("https://listing.test/markets/stocks-live/"),
            ),
            crypto_source(),
        ])
        .with_curated(Vec::new());

    let build = fetcher.fetch_all().await;

    // Then: the malformed source is reported and the healthy one landed anyway
    assert_eq!(build.failures.len(), 1);
    assert_eq!(build.failures[0].source, "stock");
    assert!(build.failures[0].message.contains("columns"));
    assert_eq!(build.records.len(), 1);
    assert_eq!(build.records[0].ticker, "BTC-USD");
}

#[tokio::test]
async fn when_every_source_answers_empty_the_build_is_empty_but_clean() {
    // Given: a listing page with no table on it
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(
        "/markets/crypto/",
        HttpResponse::ok("<html><body><p>down for maintenance</p></body></html>"),
    );

    let fetcher = TickerFetcher::new(transport, TickerCache::new(), &AcquireConfig::offline())
        .with_sources(vec![crypto_source()])
        .with_curated(Vec::new());

    let build = fetcher.fetch_all().await;

    assert!(build.records.is_empty());
    assert!(build.failures.is_empty());
}

#[tokio::test]
async fn when_scraped_and_curated_sources_overlap_the_scraped_record_wins() {
    // Given: a stock listing that already carries a curated index symbol
    let transport = Arc::new(ScriptedTransport::new());
    transport.route(
        "/markets/stocks-live/",
        HttpResponse::ok(listing_page(&[
            ("AAPL", "Apple Inc."),
            ("^GSPC", "Tracked Index"),
        ])),
    );

    let fetcher = TickerFetcher::new(transport, TickerCache::new(), &AcquireConfig::offline())
        .with_sources(vec![SegmentSource::simple(
            Segment::Stock,
            String::from("https://listing.test/markets/stocks-live/"),
        )])
        .with_curated(registry());

    let build = fetcher.fetch_all().await;

    // Then: the scraped occurrence of the symbol is the one kept
    let gspc: Vec<_> = build
        .records
        .iter()
        .filter(|record| record.ticker == "^GSPC")
        .collect();
    assert_eq!(gspc.len(), 1);
    assert_eq!(gspc[0].segment, Segment::Stock);
    assert_eq!(gspc[0].name.as_deref(), Some("Tracked Index"));

    // And: the rest of the curated catalog still joined
    assert!(build
        .records
        .iter()
        .any(|record| record.ticker == "^DJI" && record.segment == Segment::WorldIndex));
    assert!(build
        .records
        .iter()
        .any(|record| record.ticker == "SPACEX.PVT" && record.segment == Segment::PrivateCompany));
}

// =============================================================================
// Ad-Hoc Classification
// =============================================================================

#[test]
fn when_ad_hoc_symbols_are_classified_only_their_shape_matters() {
    let records = TickerFetcher::fetch_specific(vec![
        "aapl",
        "BTC-USD",
        "EURUSD=X",
        "ES=F",
        "^GSPC",
        "SPACEX.PVT",
        "UNKNOWABLE-LONG-THING",
    ]);

    let pairs: Vec<(&str, Segment)> = records
        .iter()
        .map(|record| (record.ticker.as_str(), record.segment))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("AAPL", Segment::Stock),
            ("BTC-USD", Segment::Crypto),
            ("EURUSD=X", Segment::Forex),
            ("ES=F", Segment::Futures),
            ("^GSPC", Segment::WorldIndex),
            ("SPACEX.PVT", Segment::PrivateCompany),
            ("UNKNOWABLE-LONG-THING", Segment::Unknown),
        ]
    );

    // Ad-hoc records never carry a display name
    assert!(records.iter().all(|record| record.name.is_none()));
}

#[test]
fn when_ad_hoc_input_repeats_a_symbol_every_occurrence_is_returned() {
    let records = TickerFetcher::fetch_specific(vec!["AAPL", "aapl"]);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].ticker, records[1].ticker);
}
