mod classify;
mod filings;
mod segments;
mod tickers;

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tickerscout_core::{AcquireConfig, DocumentClient, HttpTransport, ReqwestTransport};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::fixtures;
use crate::metadata::{Response, RunMetadata, SourceError};

/// Payload produced by one command run, before metadata is attached.
pub struct CommandResult {
    pub data: Value,
    pub count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<SourceError>,
}

impl CommandResult {
    pub fn ok(data: Value, count: usize) -> Self {
        Self {
            data,
            count,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<SourceError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Response, CliError> {
    let config = if cli.mock {
        AcquireConfig::offline()
    } else {
        AcquireConfig::default()
    };

    let started = Instant::now();
    let result = match &cli.command {
        Command::Tickers(args) => {
            tickers::run(args, acquisition_transport(cli.mock), &config).await?
        }
        Command::Classify(args) => classify::run(args)?,
        Command::Filings(args) => {
            let client = if cli.mock {
                DocumentClient::new(fixtures::transport(), &config)
            } else {
                DocumentClient::over_network(&config)
            };
            filings::run(args, &client).await?
        }
        Command::Segments => segments::run()?,
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let CommandResult {
        data,
        count,
        warnings,
        errors,
    } = result;

    let mut meta = RunMetadata::new(elapsed_ms, count);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Response { meta, data, errors })
}

fn acquisition_transport(mock: bool) -> Arc<dyn HttpTransport> {
    if mock {
        fixtures::transport()
    } else {
        Arc::new(ReqwestTransport::new())
    }
}
