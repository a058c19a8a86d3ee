//! Curated ticker catalog for segments no listing page covers.
//!
//! A fixed registry of named getters, run after the scraped segments.
//! Each getter returns static records with the segment label already
//! attached; nothing here touches the network.

use tracing::debug;

use crate::domain::{Segment, TickerRecord};

/// One registry entry: a stable name for logging, the segment its
/// records carry, and the getter itself.
#[derive(Debug, Clone)]
pub struct CuratedSource {
    pub name: &'static str,
    pub segment: Segment,
    pub getter: fn() -> Vec<TickerRecord>,
}

/// Registry entries in fusion order.
pub fn registry() -> Vec<CuratedSource> {
    vec![
        CuratedSource {
            name: "world_indices",
            segment: Segment::WorldIndex,
            getter: world_indices,
        },
        CuratedSource {
            name: "government_bonds",
            segment: Segment::Bond,
            getter: government_bonds,
        },
        CuratedSource {
            name: "index_options",
            segment: Segment::Option,
            getter: index_options,
        },
        CuratedSource {
            name: "private_companies",
            segment: Segment::PrivateCompany,
            getter: private_companies,
        },
    ]
}

const WORLD_INDICES: [(&str, &str); 12] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^IXIC", "NASDAQ Composite"),
    ("^NYA", "NYSE Composite"),
    ("^RUT", "Russell 2000"),
    ("^VIX", "CBOE Volatility Index"),
    ("^FTSE", "FTSE 100"),
    ("^GDAXI", "DAX Performance Index"),
    ("^FCHI", "CAC 40"),
    ("^N225", "Nikkei 225"),
    ("^HSI", "Hang Seng Index"),
    ("^STOXX50E", "EURO STOXX 50"),
];

const GOVERNMENT_BONDS: [(&str, &str); 4] = [
    ("^IRX", "13 Week Treasury Bill"),
    ("^FVX", "Treasury Yield 5 Years"),
    ("^TNX", "Treasury Yield 10 Years"),
    ("^TYX", "Treasury Yield 30 Years"),
];

const INDEX_OPTIONS: [(&str, &str); 4] = [
    ("SPX", "S&P 500 Index Options"),
    ("SPXW", "S&P 500 Weekly Options"),
    ("NDX", "NASDAQ 100 Index Options"),
    ("XSP", "Mini-SPX Index Options"),
];

const PRIVATE_COMPANIES: [(&str, &str); 4] = [
    ("SPACEX.PVT", "SpaceX"),
    ("STRIPE.PVT", "Stripe"),
    ("BYTEDANCE.PVT", "ByteDance"),
    ("KLARNA.PVT", "Klarna"),
];

pub fn world_indices() -> Vec<TickerRecord> {
    records(Segment::WorldIndex, &WORLD_INDICES)
}

pub fn government_bonds() -> Vec<TickerRecord> {
    records(Segment::Bond, &GOVERNMENT_BONDS)
}

pub fn index_options() -> Vec<TickerRecord> {
    records(Segment::Option, &INDEX_OPTIONS)
}

pub fn private_companies() -> Vec<TickerRecord> {
    records(Segment::PrivateCompany, &PRIVATE_COMPANIES)
}

fn records(segment: Segment, entries: &[(&str, &str)]) -> Vec<TickerRecord> {
    entries
        .iter()
        .filter_map(|(ticker, name)| {
            match TickerRecord::new(*ticker, Some((*name).to_string()), segment) {
                Ok(record) => Some(record),
                Err(error) => {
                    debug!(ticker, %error, "skipping malformed catalog entry");
                    None
                }
            }
        })
        .collect()
}
