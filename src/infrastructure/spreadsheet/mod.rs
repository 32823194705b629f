//! DSM workbook access.
//!
//! The workbook is read once per session into memory; [`Workbook::parse`]
//! then hands out a [`SheetTable`] per worksheet, addressed by zero-based
//! data row index below the header row.

mod table;
mod workbook;
mod xlsx;

pub use table::{SheetTable, count_http, extract_first_url};
pub use workbook::{Grid, SpreadsheetError, Workbook};
