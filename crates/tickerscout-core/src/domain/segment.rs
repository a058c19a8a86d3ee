use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Market segment a ticker belongs to.
///
/// `Unknown` only ever comes out of [`Segment::classify`]; fetched and
/// curated records always carry a concrete segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Stock,
    Crypto,
    Forex,
    Etf,
    MutualFund,
    Futures,
    WorldIndex,
    Bond,
    Option,
    PrivateCompany,
    Unknown,
}

/// Index names accepted without a leading caret.
const WORLD_INDEX_NAMES: [&str; 12] = [
    "GSPC", "DJI", "IXIC", "NYA", "RUT", "VIX", "FTSE", "GDAXI", "FCHI", "N225", "HSI",
    "STOXX50E",
];

impl Segment {
    /// Every concrete segment, in universe iteration order.
    pub const ALL: [Segment; 10] = [
        Segment::Stock,
        Segment::Crypto,
        Segment::Forex,
        Segment::Etf,
        Segment::MutualFund,
        Segment::Futures,
        Segment::WorldIndex,
        Segment::Bond,
        Segment::Option,
        Segment::PrivateCompany,
    ];

    /// Segments backed by a listing-page source; the rest come from the
    /// curated catalog.
    pub const SCRAPED: [Segment; 6] = [
        Segment::Stock,
        Segment::Crypto,
        Segment::Forex,
        Segment::Etf,
        Segment::MutualFund,
        Segment::Futures,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
            Self::Forex => "forex",
            Self::Etf => "etf",
            Self::MutualFund => "mutual_fund",
            Self::Futures => "futures",
            Self::WorldIndex => "world_index",
            Self::Bond => "bond",
            Self::Option => "option",
            Self::PrivateCompany => "private_company",
            Self::Unknown => "unknown",
        }
    }

    /// Classify an ad-hoc ticker by its shape alone.
    ///
    /// Purely lexical: no lookup, no network. The rules mirror the
    /// suffix conventions of the upstream quote service (`=X` currency
    /// pairs, `=F` futures contracts, `-USD` coin pairs, `^` indices,
    /// `.PVT` private placements). Input is trimmed and uppercased
    /// before matching.
    pub fn classify(raw: &str) -> Self {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            return Self::Unknown;
        }
        if ticker.ends_with("=X") {
            return Self::Forex;
        }
        if ticker.ends_with("=F") {
            return Self::Futures;
        }
        if ticker.ends_with("-USD") {
            return Self::Crypto;
        }
        if ticker.starts_with('^') || WORLD_INDEX_NAMES.contains(&ticker.as_str()) {
            return Self::WorldIndex;
        }
        if ticker.ends_with(".PVT") {
            return Self::PrivateCompany;
        }
        if ticker.len() <= 5 && ticker.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Self::Stock;
        }
        Self::Unknown
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Segment {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "crypto" => Ok(Self::Crypto),
            "forex" => Ok(Self::Forex),
            "etf" => Ok(Self::Etf),
            "mutual_fund" => Ok(Self::MutualFund),
            "futures" => Ok(Self::Futures),
            "world_index" => Ok(Self::WorldIndex),
            "bond" => Ok(Self::Bond),
            "option" => Ok(Self::Option),
            "private_company" => Ok(Self::PrivateCompany),
            other => Err(ValidationError::InvalidSegment {
                value: other.to_string(),
            }),
        }
    }
}
