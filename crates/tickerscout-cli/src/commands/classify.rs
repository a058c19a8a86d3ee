use serde::Serialize;
use tickerscout_core::{TickerFetcher, TickerRecord};

use crate::cli::ClassifyArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ClassifyResponseData {
    tickers: Vec<TickerRecord>,
}

pub fn run(args: &ClassifyArgs) -> Result<CommandResult, CliError> {
    let records = TickerFetcher::fetch_specific(&args.symbols);
    let dropped = args.symbols.len().saturating_sub(records.len());

    let count = records.len();
    let data = serde_json::to_value(ClassifyResponseData { tickers: records })?;

    let mut result = CommandResult::ok(data, count);
    if dropped > 0 {
        result = result.with_warning(format!("{dropped} symbol(s) failed validation"));
    }
    Ok(result)
}
