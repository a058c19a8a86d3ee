use std::sync::Arc;

use serde::Serialize;
use tickerscout_core::{
    AcquireConfig, HttpTransport, Segment, TickerCache, TickerFetcher, TickerRecord,
};

use crate::cli::TickersArgs;
use crate::error::CliError;
use crate::metadata::SourceError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct TickersResponseData {
    tickers: Vec<TickerRecord>,
}

pub async fn run(
    args: &TickersArgs,
    transport: Arc<dyn HttpTransport>,
    config: &AcquireConfig,
) -> Result<CommandResult, CliError> {
    let fetcher = TickerFetcher::new(transport, TickerCache::new(), config);

    let build = match &args.segment {
        Some(raw) => {
            let segment: Segment = raw.parse()?;
            fetcher
                .fetch_segment(segment)
                .await
                .map_err(|error| CliError::Command(error.to_string()))?
        }
        None => fetcher.fetch_all().await,
    };

    let errors = build
        .failures
        .iter()
        .map(|failure| SourceError {
            source: failure.source.clone(),
            message: failure.message.clone(),
        })
        .collect();

    let count = build.records.len();
    let data = serde_json::to_value(TickersResponseData {
        tickers: build.records,
    })?;

    Ok(CommandResult::ok(data, count).with_errors(errors))
}
