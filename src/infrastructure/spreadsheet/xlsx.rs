//! `.xlsx` loading via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, info, warn};

use super::workbook::{Grid, SpreadsheetError, Workbook};

impl Workbook {
    /// Reads every worksheet of a workbook file into memory.
    ///
    /// Worksheets that fail to read are skipped with a warning, so a single
    /// broken sheet does not make the rest of the DSM unusable.
    ///
    /// # Errors
    ///
    /// Returns [`SpreadsheetError::Open`] if the file cannot be opened as a workbook.
    pub fn open(path: &Path) -> Result<Self, SpreadsheetError> {
        let mut source = open_workbook_auto(path)
            .map_err(|e| SpreadsheetError::Open(format!("{}: {}", path.display(), e)))?;

        let mut workbook = Workbook::new();
        for name in source.sheet_names() {
            match source.worksheet_range(&name) {
                Ok(range) => {
                    let grid = to_grid(&range);
                    debug!("Loaded worksheet '{}' ({} rows)", name, grid.len());
                    workbook.insert_sheet(name, grid);
                }
                Err(e) => warn!("Skipping worksheet '{}': {}", name, e),
            }
        }

        info!(
            "Loaded DSM workbook {} ({} worksheets)",
            path.display(),
            workbook.sheet_names().len()
        );
        Ok(workbook)
    }
}

/// Converts a calamine range into a grid whose row 0 is the sheet's first row.
fn to_grid(range: &calamine::Range<Data>) -> Grid {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };

    (0..=end_row)
        .map(|row| {
            (0..=end_col)
                .map(|col| range.get_value((row, col)).and_then(cell_text))
                .collect()
        })
        .collect()
}

/// Renders a cell as text; empty and error cells are absent.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    };

    (!text.trim().is_empty()).then_some(text)
}
