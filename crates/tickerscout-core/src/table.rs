//! First-table extraction from upstream listing pages.

use scraper::{ElementRef, Html, Selector};

/// The first `<table>` of a document, flattened to trimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ListingTable {
    /// Index of the first header matching any candidate,
    /// case-insensitively.
    pub fn column(&self, candidates: &[String]) -> Option<usize> {
        self.headers.iter().position(|header| {
            candidates
                .iter()
                .any(|candidate| header.eq_ignore_ascii_case(candidate))
        })
    }

    /// Cell text at (row, column), if present.
    pub fn cell<'a>(&'a self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Parse the first table of an HTML document.
///
/// Header cells come from the first row carrying `<th>` elements; a
/// table publishing its header as a plain `<td>` row is accepted too.
/// Returns `None` when the document has no table or the table has no
/// cells at all, which callers surface as an empty fetch.
pub fn first_table(html: &str) -> Option<ListingTable> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").ok()?;
    let row_selector = Selector::parse("tr").ok()?;
    let header_selector = Selector::parse("th").ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    let table = document.select(&table_selector).next()?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for row in table.select(&row_selector) {
        if headers.is_empty() {
            let header_cells: Vec<String> = row.select(&header_selector).map(cell_text).collect();
            if !header_cells.is_empty() {
                headers = header_cells;
                continue;
            }
        }

        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if headers.is_empty() {
            headers = cells;
            continue;
        }
        rows.push(cells);
    }

    if headers.is_empty() {
        return None;
    }

    Some(ListingTable { headers, rows })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
