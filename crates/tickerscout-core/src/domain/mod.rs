//! # Domain Model
//!
//! Canonical types for the ticker universe.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TickerRecord`] | One universe entry: ticker, optional name, segment |
//! | [`Segment`] | Market segment, plus shape-based classification |
//!
//! Both types validate at construction so downstream code never sees
//! an empty ticker or an unnamed segment string.

mod segment;
mod ticker;

pub use segment::Segment;
pub use ticker::{TickerRecord, MAX_TICKER_LEN};
