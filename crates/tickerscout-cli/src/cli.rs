//! CLI argument definitions for tickerscout.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tickers` | Build the ticker universe (all segments or one) |
//! | `classify` | Classify ad-hoc symbols by their shape, offline |
//! | `filings` | Fetch SEC filing rows for a ticker |
//! | `segments` | List known segments and how each is sourced |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--output` | stdout | Write the rendered response to a file |
//! | `--mock` | `false` | Serve canned fixtures instead of the network |
//!
//! # Examples
//!
//! ```bash
//! # Build the whole universe
//! tickerscout tickers
//!
//! # One segment, table output
//! tickerscout tickers --segment crypto --format table
//!
//! # Classify symbols without touching the network
//! tickerscout classify AAPL BTC-USD EURUSD=X ^GSPC
//!
//! # SEC filings for one ticker
//! tickerscout filings AAPL --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Resilient ticker-universe acquisition CLI.
///
/// Builds a fused ticker universe from scraped listing pages plus a
/// curated catalog, classifies ad-hoc symbols, and fetches SEC filing
/// documents through a crumb-authenticated session.
#[derive(Debug, Parser)]
#[command(
    name = "tickerscout",
    author,
    version,
    about = "Ticker universe acquisition CLI"
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON object (default)
    /// - ndjson: One JSON object per record line
    /// - table: Aligned text for terminal display
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Write the rendered response to a file instead of stdout.
    #[arg(long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Serve canned fixtures through the real acquisition path.
    ///
    /// No network access, no rate-limit waits, no retry delays.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📇 Build the ticker universe from every configured source.
    ///
    /// Scrapes the listing segments, appends the curated catalog, and
    /// fuses the results with first-occurrence-wins deduplication.
    /// Sources that fail are reported as errors, never fatal.
    ///
    /// # Examples
    ///
    ///   tickerscout tickers
    ///   tickerscout tickers --segment etf --pretty
    Tickers(TickersArgs),

    /// 🏷️ Classify ad-hoc symbols by their shape.
    ///
    /// Pure classification, no network: suffix and prefix rules assign
    /// each symbol a segment. Symbols that fail validation are dropped
    /// with a warning.
    ///
    /// # Examples
    ///
    ///   tickerscout classify AAPL BTC-USD EURUSD=X ^GSPC
    Classify(ClassifyArgs),

    /// 📄 Fetch SEC filing rows for a ticker.
    ///
    /// Goes through the crumb-authenticated document endpoint with
    /// rate limiting, retries, and one session refresh on auth
    /// rejection.
    ///
    /// # Examples
    ///
    ///   tickerscout filings AAPL
    ///   tickerscout filings TSLA --format ndjson
    Filings(FilingsArgs),

    /// 🗂️ List known segments and how each is sourced.
    Segments,
}

/// Arguments for the `tickers` command.
#[derive(Debug, Args)]
pub struct TickersArgs {
    /// Restrict the build to one segment (e.g. stock, crypto, world_index).
    #[arg(long)]
    pub segment: Option<String>,
}

/// Arguments for the `classify` command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// One or more raw symbols (e.g. AAPL, BTC-USD, EURUSD=X).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

/// Arguments for the `filings` command.
#[derive(Debug, Args)]
pub struct FilingsArgs {
    /// Ticker to fetch filings for.
    pub ticker: String,
}
