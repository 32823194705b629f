//! In-memory spreadsheet workbook.

use tracing::debug;

use super::table::SheetTable;

pub type Grid = Vec<Vec<Option<String>>>;

/// Errors raised while opening or parsing a workbook.
#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Failed to open workbook: {0}")]
    Open(String),

    #[error("Worksheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Header row {header_row} is outside worksheet '{sheet}'")]
    HeaderOutOfRange { sheet: String, header_row: usize },
}

/// All worksheets of a workbook, held as text grids.
///
/// Grid row `0` is the first row of the worksheet (sheet row 1), so a
/// zero-based header index refers to the same row whether or not the sheet
/// starts with blank rows.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Grid)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a worksheet from raw cells; empty strings become empty cells.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let workbook = Workbook::new().with_sheet(
    ///     "Enterprise",
    ///     vec![vec!["TITLE", "EXISTING URL"], vec!["About", "http://web.musc.edu/about"]],
    /// );
    /// ```
    pub fn with_sheet<R, C>(mut self, name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = Vec<C>>,
        C: AsRef<str>,
    {
        let grid = rows
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|c| {
                        let c = c.as_ref();
                        (!c.is_empty()).then(|| c.to_string())
                    })
                    .collect()
            })
            .collect();
        self.insert_sheet(name, grid);
        self
    }

    /// Adds or replaces a worksheet grid.
    pub fn insert_sheet(&mut self, name: impl Into<String>, grid: Grid) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = grid,
            None => self.sheets.push((name, grid)),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Parses a worksheet with column headers on row `header_row` (0-based).
    ///
    /// Trailing rows that are entirely empty are dropped; blank rows between
    /// data rows are kept so row indices stay aligned with the sheet.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadsheetError::SheetNotFound`] if no sheet has that name.
    /// Returns [`SpreadsheetError::HeaderOutOfRange`] if the sheet has no row `header_row`.
    pub fn parse(&self, sheet: &str, header_row: usize) -> Result<SheetTable, SpreadsheetError> {
        let (_, grid) = self
            .sheets
            .iter()
            .find(|(n, _)| n == sheet)
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet.to_string()))?;

        let headers = grid
            .get(header_row)
            .cloned()
            .ok_or_else(|| SpreadsheetError::HeaderOutOfRange {
                sheet: sheet.to_string(),
                header_row,
            })?;

        let mut rows: Grid = grid[header_row + 1..].to_vec();
        while rows
            .last()
            .is_some_and(|row| row.iter().all(Option::is_none))
        {
            rows.pop();
        }

        debug!("Parsed sheet '{}' with {} data rows", sheet, rows.len());
        Ok(SheetTable::new(headers, rows))
    }
}
