//! Response rendering for the supported output formats.
//!
//! Every format renders to a string first so `--output` can write the
//! exact bytes that would have gone to stdout.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Response;

pub fn render(
    response: &Response,
    format: OutputFormat,
    pretty: bool,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let rendered = render_to_string(response, format, pretty)?;
    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn render_to_string(
    response: &Response,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(response)?
            } else {
                serde_json::to_string(response)?
            };
            Ok(format!("{payload}\n"))
        }
        OutputFormat::Ndjson => render_ndjson(response),
        OutputFormat::Table => render_table(response),
    }
}

/// One metadata line, one line per record, one line per source error.
fn render_ndjson(response: &Response) -> Result<String, CliError> {
    let mut out = String::new();
    out.push_str(&serde_json::to_string(&json!({ "meta": response.meta }))?);
    out.push('\n');

    match rows_of(&response.data) {
        Some(rows) => {
            for row in rows {
                out.push_str(&serde_json::to_string(row)?);
                out.push('\n');
            }
        }
        None => {
            out.push_str(&serde_json::to_string(&response.data)?);
            out.push('\n');
        }
    }

    for error in &response.errors {
        out.push_str(&serde_json::to_string(&json!({ "error": error }))?);
        out.push('\n');
    }

    Ok(out)
}

fn render_table(response: &Response) -> Result<String, CliError> {
    let mut out = String::new();
    out.push_str(&format!("request_id : {}\n", response.meta.request_id));
    out.push_str(&format!("elapsed_ms : {}\n", response.meta.elapsed_ms));
    out.push_str(&format!("count      : {}\n", response.meta.count));

    if !response.meta.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &response.meta.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    match rows_of(&response.data) {
        Some(rows) if !rows.is_empty() && rows.iter().all(Value::is_object) => {
            out.push('\n');
            out.push_str(&render_rows(rows));
        }
        _ => {
            out.push_str("data:\n");
            let pretty_data = serde_json::to_string_pretty(&response.data)?;
            for line in pretty_data.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
    }

    if !response.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &response.errors {
            out.push_str(&format!("  - {}: {}\n", error.source, error.message));
        }
    }

    Ok(out)
}

/// The streamable rows of a payload: its single array field, if any.
fn rows_of(data: &Value) -> Option<&Vec<Value>> {
    let object = data.as_object()?;
    let mut arrays = object.values().filter_map(Value::as_array);
    let first = arrays.next()?;
    if arrays.next().is_some() {
        return None;
    }
    Some(first)
}

/// Aligned columns over the union of row keys.
fn render_rows(rows: &[Value]) -> String {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Some(object) = row.as_object() {
            for key in object.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let mut grid: Vec<Vec<String>> = vec![columns.clone()];
    for row in rows {
        let object = match row.as_object() {
            Some(object) => object,
            None => continue,
        };
        grid.push(
            columns
                .iter()
                .map(|column| object.get(column).map(cell_text).unwrap_or_default())
                .collect(),
        );
    }

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, _)| {
            grid.iter()
                .map(|cells| cells[index].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for cells in &grid {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RunMetadata, SourceError};

    fn sample_response() -> Response {
        Response {
            meta: RunMetadata::new(7, 2),
            data: json!({
                "tickers": [
                    { "ticker": "AAPL", "name": "Apple Inc.", "segment": "stock" },
                    { "ticker": "BTC-USD", "name": null, "segment": "crypto" },
                ]
            }),
            errors: Vec::new(),
        }
    }

    #[test]
    fn json_format_emits_one_object() {
        let rendered =
            render_to_string(&sample_response(), OutputFormat::Json, false).expect("renders");
        let parsed: Value = serde_json::from_str(rendered.trim()).expect("parses back");
        assert_eq!(parsed["meta"]["count"], 2);
        assert_eq!(parsed["data"]["tickers"][0]["ticker"], "AAPL");
    }

    #[test]
    fn ndjson_streams_one_record_per_line() {
        let rendered =
            render_to_string(&sample_response(), OutputFormat::Ndjson, false).expect("renders");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"meta\""));
        assert!(lines[1].contains("AAPL"));
        assert!(lines[2].contains("BTC-USD"));
    }

    #[test]
    fn table_aligns_record_columns() {
        let rendered =
            render_to_string(&sample_response(), OutputFormat::Table, false).expect("renders");
        assert!(rendered.contains("count      : 2"));
        assert!(rendered.contains("ticker"));
        assert!(rendered.contains("AAPL"));
        // null names render as a placeholder, not the word "null"
        assert!(rendered.contains(" -"));
    }

    #[test]
    fn table_lists_source_errors() {
        let mut response = sample_response();
        response.errors.push(SourceError {
            source: String::from("stock"),
            message: String::from("gave up after 10 tries"),
        });

        let rendered =
            render_to_string(&response, OutputFormat::Table, false).expect("renders");
        assert!(rendered.contains("errors:"));
        assert!(rendered.contains("stock: gave up after 10 tries"));
    }

    #[test]
    fn output_file_receives_the_exact_render() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.json");
        let response = sample_response();

        render(&response, OutputFormat::Json, true, Some(&path)).expect("renders to file");

        let written = std::fs::read_to_string(&path).expect("file exists");
        let expected =
            render_to_string(&response, OutputFormat::Json, true).expect("renders to string");
        assert_eq!(written, expected);
    }
}
