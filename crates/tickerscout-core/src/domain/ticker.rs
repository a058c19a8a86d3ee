use serde::{Deserialize, Serialize};

use crate::domain::segment::Segment;
use crate::error::ValidationError;

/// Longest ticker accepted from any source.
pub const MAX_TICKER_LEN: usize = 32;

/// One entry of the ticker universe.
///
/// Construction validates the ticker so a record never carries an
/// empty or whitespace-bearing symbol; `name` stays `None` when the
/// source did not publish one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub ticker: String,
    pub name: Option<String>,
    pub segment: Segment,
}

impl TickerRecord {
    /// Build a record from source-published values.
    ///
    /// The ticker is trimmed but otherwise kept as published; empty
    /// names collapse to `None`.
    pub fn new(
        ticker: impl Into<String>,
        name: Option<String>,
        segment: Segment,
    ) -> Result<Self, ValidationError> {
        let ticker = validate_ticker(ticker.into())?;
        let name = name
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Ok(Self {
            ticker,
            name,
            segment,
        })
    }

    /// Build a record for an ad-hoc symbol the caller typed in.
    ///
    /// Uppercases the input and derives the segment from its shape via
    /// [`Segment::classify`]; no lookup is performed.
    pub fn ad_hoc(raw: &str) -> Result<Self, ValidationError> {
        let ticker = validate_ticker(raw.to_uppercase())?;
        let segment = Segment::classify(&ticker);
        Ok(Self {
            ticker,
            name: None,
            segment,
        })
    }
}

fn validate_ticker(raw: String) -> Result<String, ValidationError> {
    let ticker = raw.trim().to_string();
    if ticker.is_empty() {
        return Err(ValidationError::EmptyTicker);
    }
    if ticker.len() > MAX_TICKER_LEN {
        return Err(ValidationError::TickerTooLong {
            len: ticker.len(),
            max: MAX_TICKER_LEN,
        });
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(ValidationError::TickerHasWhitespace { value: ticker });
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_ticker_and_collapses_blank_name() {
        let record = TickerRecord::new(" AAPL ", Some(String::from("  ")), Segment::Stock)
            .expect("valid record");
        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.name, None);
    }

    #[test]
    fn rejects_empty_ticker() {
        let error = TickerRecord::new("   ", None, Segment::Stock).expect_err("rejected");
        assert_eq!(error, ValidationError::EmptyTicker);
    }

    #[test]
    fn rejects_inner_whitespace() {
        let error =
            TickerRecord::new("AMERICAN AIR", None, Segment::Stock).expect_err("rejected");
        assert!(matches!(error, ValidationError::TickerHasWhitespace { .. }));
    }

    #[test]
    fn ad_hoc_uppercases_and_classifies() {
        let record = TickerRecord::ad_hoc("eurusd=x").expect("valid record");
        assert_eq!(record.ticker, "EURUSD=X");
        assert_eq!(record.segment, Segment::Forex);
        assert_eq!(record.name, None);
    }

    #[test]
    fn serializes_with_null_name() {
        let record = TickerRecord::new("^GSPC", None, Segment::WorldIndex).expect("valid");
        let rendered = serde_json::to_string(&record).expect("serializes");
        assert_eq!(
            rendered,
            "{\"ticker\":\"^GSPC\",\"name\":null,\"segment\":\"world_index\"}"
        );
    }
}
