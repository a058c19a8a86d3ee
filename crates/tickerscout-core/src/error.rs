use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation and contract errors exposed by `tickerscout-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains whitespace: '{value}'")]
    TickerHasWhitespace { value: String },

    #[error("invalid segment '{value}', expected one of stock, etf, mutual_fund, crypto, forex, futures, world_index, bond, option, private_company")]
    InvalidSegment { value: String },
}

/// Classification of an acquisition failure.
///
/// The `retryable` flag on [`FetchError`] follows the kind: everything
/// except structural misconfiguration retries. Decode failures stay
/// retryable on purpose, matching the upstream scraper this replaces,
/// which retried on any error whatsoever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Connection, DNS, or timeout failure below the HTTP layer.
    Transport,
    /// Non-success HTTP status from the upstream.
    Upstream,
    /// Response arrived but could not be parsed.
    Decode,
    /// The session's crumb or cookie was rejected.
    AuthExpired,
    /// The listing table lacks the required symbol/name columns.
    MissingColumns,
    /// No source is configured for the requested segment.
    UnknownSegment,
}

/// Error raised while acquiring reference data from an upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
    retryable: bool,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn upstream(status: u16, url: &str) -> Self {
        Self {
            kind: FetchErrorKind::Upstream,
            message: format!("upstream returned HTTP {status} for {url}"),
            retryable: true,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Decode,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::AuthExpired,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn missing_columns(segment: &str, candidates: &[String]) -> Self {
        Self {
            kind: FetchErrorKind::MissingColumns,
            message: format!(
                "listing table for segment '{segment}' has none of the required columns [{}]",
                candidates.join(", ")
            ),
            retryable: false,
        }
    }

    pub fn unknown_segment(segment: &str) -> Self {
        Self {
            kind: FetchErrorKind::UnknownSegment,
            message: format!("no source is configured for segment '{segment}'"),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Transport => "fetch.transport",
            FetchErrorKind::Upstream => "fetch.upstream",
            FetchErrorKind::Decode => "fetch.decode",
            FetchErrorKind::AuthExpired => "fetch.auth_expired",
            FetchErrorKind::MissingColumns => "fetch.missing_columns",
            FetchErrorKind::UnknownSegment => "fetch.unknown_segment",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_are_not_retryable() {
        let missing = FetchError::missing_columns("stock", &[String::from("symbol")]);
        assert_eq!(missing.kind(), FetchErrorKind::MissingColumns);
        assert!(!missing.retryable());

        let unknown = FetchError::unknown_segment("bond");
        assert_eq!(unknown.kind(), FetchErrorKind::UnknownSegment);
        assert!(!unknown.retryable());
    }

    #[test]
    fn decode_errors_stay_retryable() {
        let error = FetchError::decode("unexpected token at line 1");
        assert!(error.retryable());
        assert_eq!(error.code(), "fetch.decode");
    }

    #[test]
    fn display_includes_machine_code() {
        let error = FetchError::upstream(503, "https://example.test/list");
        let rendered = error.to_string();
        assert!(rendered.starts_with("fetch.upstream:"));
        assert!(rendered.contains("503"));
    }
}
