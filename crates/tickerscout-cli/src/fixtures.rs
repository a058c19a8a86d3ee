//! Canned responses for `--mock` mode.
//!
//! Routes a scripted transport by URL substring so every command runs
//! its real acquisition path end to end without the network: listing
//! pages for each scraped segment, the cookie/crumb handshake, and a
//! filings document body.

use std::sync::Arc;

use tickerscout_core::{HttpResponse, ScriptedTransport};

const FILINGS_BODY: &str = r#"{
    "quoteSummary": {
        "result": [{
            "secFilings": {
                "filings": [
                    {
                        "date": "2024-02-02",
                        "epochDate": 1706832000,
                        "type": "10-K",
                        "title": "Annual Report",
                        "edgarUrl": "https://finance.yahoo.com/sec-filing/1",
                        "maxAge": 1
                    },
                    {
                        "date": "2023-11-03",
                        "epochDate": 1698969600,
                        "type": "10-Q",
                        "title": "Quarterly Report",
                        "edgarUrl": "https://finance.yahoo.com/sec-filing/2",
                        "maxAge": 1
                    }
                ]
            }
        }],
        "error": null
    }
}"#;

pub fn transport() -> Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();

    transport.route(
        "/screener/stocks/",
        HttpResponse::ok(listing_page(&[
            ("AAPL", "Apple Inc."),
            ("MSFT", "Microsoft Corporation"),
            ("NVDA", "NVIDIA Corporation"),
        ])),
    );
    transport.route(
        "/markets/crypto/",
        HttpResponse::ok(listing_page(&[
            ("BTC-USD", "Bitcoin USD"),
            ("ETH-USD", "Ethereum USD"),
        ])),
    );
    transport.route(
        "/markets/currencies/",
        HttpResponse::ok(listing_page(&[
            ("EURUSD=X", "EUR/USD"),
            ("GBPUSD=X", "GBP/USD"),
        ])),
    );
    transport.route(
        "/screener/etfs/",
        HttpResponse::ok(listing_page(&[
            ("SPY", "SPDR S&P 500 ETF Trust"),
            ("QQQ", "Invesco QQQ Trust"),
        ])),
    );
    transport.route(
        "/screener/mutual-funds/",
        HttpResponse::ok(listing_page(&[
            ("VTSAX", "Vanguard Total Stock Market Index Fund"),
            ("FXAIX", "Fidelity 500 Index Fund"),
        ])),
    );
    transport.route(
        "/markets/futures/",
        HttpResponse::ok(listing_page(&[
            ("ES=F", "E-Mini S&P 500"),
            ("GC=F", "Gold"),
        ])),
    );

    transport.route(
        "fc.yahoo.com",
        HttpResponse::with_status(404, "")
            .with_header("set-cookie", "A3=mock; Path=/; Domain=.yahoo.com"),
    );
    transport.route("getcrumb", HttpResponse::ok("mockcrumb"));
    transport.route("quoteSummary", HttpResponse::ok(FILINGS_BODY));

    Arc::new(transport)
}

fn listing_page(rows: &[(&str, &str)]) -> String {
    let mut body = String::from(
        "<html><body><table><thead><tr><th>Symbol</th><th>Name</th></tr></thead><tbody>",
    );
    for (symbol, name) in rows {
        body.push_str(&format!("<tr><td>{symbol}</td><td>{name}</td></tr>"));
    }
    body.push_str("</tbody></table></body></html>");
    body
}
