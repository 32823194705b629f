//! Column/row access over one parsed worksheet.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s,;]+").expect("valid regex"));

/// A worksheet parsed below a header row.
///
/// Rows are addressed by a 0-based data index: row `0` is the first row
/// after the header. Cells that are empty in the workbook are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    headers: Vec<Option<String>>,
    rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    pub fn new(headers: Vec<Option<String>>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[Option<String>] {
        &self.headers
    }

    /// Finds a column by header, ignoring case and surrounding whitespace.
    ///
    /// When several headers match, the leftmost one wins.
    pub fn column_index(&self, column_name: &str) -> Option<usize> {
        let wanted = column_name.trim().to_uppercase();
        self.headers.iter().position(|header| {
            header
                .as_deref()
                .is_some_and(|h| h.trim().to_uppercase() == wanted)
        })
    }

    /// Returns the cell under `column_name` in data row `row`.
    ///
    /// A missing column, an out-of-range row, and an empty cell all yield an
    /// empty string.
    pub fn column_value(&self, row: usize, column_name: &str) -> String {
        let Some(col) = self.column_index(column_name) else {
            debug!("Column '{}' not found in sheet", column_name);
            return String::new();
        };

        let Some(cells) = self.rows.get(row) else {
            debug!("Row index {} out of range", row);
            return String::new();
        };

        cells.get(col).cloned().flatten().unwrap_or_default()
    }

    /// Returns the first URL in the existing-URL cell of `row`.
    ///
    /// DSM cells occasionally hold several URLs separated by whitespace,
    /// commas or semicolons; only the first one is kept. A cell without any
    /// `http(s)://` URL is returned trimmed.
    pub fn existing_url(&self, row: usize, column_name: &str) -> String {
        let raw = self.column_value(row, column_name);
        if raw.is_empty() {
            return String::new();
        }

        match extract_first_url(&raw) {
            Some((first, count)) => {
                if count > 1 {
                    warn!("Multiple URLs found in DSM cell; using first: {}", first);
                }
                first
            }
            None => raw.trim().to_string(),
        }
    }

    /// Returns the proposed path cell of `row`.
    pub fn proposed_url(&self, row: usize, column_name: &str) -> String {
        self.column_value(row, column_name)
    }

    /// Returns `(header, value)` for every named column of `row`.
    ///
    /// Returns `None` when the row is out of range.
    pub fn row_values(&self, row: usize) -> Option<Vec<(String, String)>> {
        let cells = self.rows.get(row)?;

        Some(
            self.headers
                .iter()
                .enumerate()
                .filter_map(|(idx, header)| {
                    let header = header.as_deref()?.trim();
                    if header.is_empty() {
                        return None;
                    }
                    let value = cells.get(idx).cloned().flatten().unwrap_or_default();
                    Some((header.to_string(), value))
                })
                .collect(),
        )
    }
}

/// Extracts the first `http(s)://` URL from a cell.
///
/// Returns the URL together with the total number of URLs found, or `None`
/// if the text contains none.
pub fn extract_first_url(value: &str) -> Option<(String, usize)> {
    let mut matches = HTTP_URL.find_iter(value);
    let first = matches.next()?.as_str().trim().to_string();
    Some((first, 1 + matches.count()))
}

/// Counts occurrences of `http` in a string.
///
/// Used to flag cells that still contain more than one URL.
pub fn count_http(value: &str) -> usize {
    value.matches("http").count()
}
