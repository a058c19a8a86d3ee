use serde::Serialize;
use tickerscout_core::{DocumentClient, DocumentRow, TickerRecord};

use crate::cli::FilingsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FilingsResponseData {
    ticker: String,
    filings: Vec<DocumentRow>,
}

pub async fn run(args: &FilingsArgs, client: &DocumentClient) -> Result<CommandResult, CliError> {
    let record = TickerRecord::ad_hoc(&args.ticker)?;

    let filings = client
        .fetch_filings(&record.ticker)
        .await
        .map_err(|error| CliError::Command(error.to_string()))?;

    let count = filings.len();
    let data = serde_json::to_value(FilingsResponseData {
        ticker: record.ticker,
        filings,
    })?;

    Ok(CommandResult::ok(data, count))
}
