use serde::Serialize;
use tickerscout_core::Segment;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SegmentsResponseData {
    segments: Vec<SegmentRow>,
}

#[derive(Debug, Serialize)]
struct SegmentRow {
    segment: Segment,
    sourced_from: &'static str,
}

pub fn run() -> Result<CommandResult, CliError> {
    let segments: Vec<SegmentRow> = Segment::ALL
        .iter()
        .map(|&segment| SegmentRow {
            segment,
            sourced_from: if Segment::SCRAPED.contains(&segment) {
                "listing page"
            } else {
                "curated catalog"
            },
        })
        .collect();

    let count = segments.len();
    let data = serde_json::to_value(SegmentsResponseData { segments })?;

    Ok(CommandResult::ok(data, count))
}
