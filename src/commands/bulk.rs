//! `bulk-check`: page counts for many DSM rows, tracked in a CSV file.
//!
//! The CSV doubles as the progress record. Rows with a domain and row
//! number but no counts yet are checked; results are written back after
//! each row, so an interrupted run picks up where it stopped.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// CSV file used when none is given.
pub const DEFAULT_CSV: &str = "bulk_check_progress.csv";

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("CSV I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV format error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<BulkError> for AppError {
    fn from(e: BulkError) -> Self {
        AppError::internal("Bulk check file error", json!({"reason": e.to_string()}))
    }
}

/// One line of the progress CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkRow {
    pub kanban_id: String,
    pub title: String,
    pub domain: String,
    pub row: String,
    pub existing_url: String,
    pub no_links: String,
    pub no_pdfs: String,
    pub no_embeds: String,
    #[serde(rename = "% difficulty")]
    pub difficulty: String,
}

impl BulkRow {
    fn note(kanban_id: &str, title: &str, domain: &str, row: &str) -> Self {
        Self {
            kanban_id: kanban_id.to_string(),
            title: title.to_string(),
            domain: domain.to_string(),
            row: row.to_string(),
            ..Default::default()
        }
    }

    /// Domain and row to check, or `None` for comments, finished rows and
    /// rows without a usable row number.
    pub fn pending(&self) -> Option<(String, usize)> {
        let domain = self.domain.trim();
        if domain.is_empty() || domain.starts_with('#') {
            return None;
        }

        let done = [&self.no_links, &self.no_pdfs, &self.no_embeds, &self.difficulty]
            .iter()
            .all(|field| !field.trim().is_empty());
        if done {
            return None;
        }

        let row = self.row.trim().parse::<usize>().ok().filter(|row| *row > 0)?;
        Some((domain.to_string(), row))
    }

    /// Spreadsheet exports sometimes keep the leading `'` that forces text.
    pub fn kanban_id(&self) -> &str {
        self.kanban_id.trim().trim_start_matches('\'')
    }
}

/// Outcome of one bulk run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkSummary {
    pub csv: PathBuf,
    pub template_created: bool,
    pub pending: usize,
    pub processed: usize,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub domain: String,
    pub row: usize,
    pub reason: String,
}

/// Writes a header plus two example rows that `pending` skips.
pub fn create_template(path: &Path) -> Result<(), BulkError> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.serialize(BulkRow::note(
        "# Kanban card ID",
        "# Page title here",
        "# Fill in domain and row, leave other columns empty",
        "",
    ))?;
    writer.serialize(BulkRow::note(
        "# Example: abc123def456",
        "# Example: Department of Surgery",
        "# Example: COM",
        "42",
    ))?;
    writer.flush()?;
    Ok(())
}

/// Reads every row; missing columns are left empty.
pub fn read_rows(path: &Path) -> Result<Vec<BulkRow>, BulkError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    reader
        .deserialize()
        .collect::<Result<Vec<BulkRow>, _>>()
        .map_err(BulkError::from)
}

/// Rewrites the whole file with the standard header.
pub fn write_rows(path: &Path, rows: &[BulkRow]) -> Result<(), BulkError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(domain: &str, row: &str) -> BulkRow {
        BulkRow {
            domain: domain.to_string(),
            row: row.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pending_skips_comments_and_bad_rows() {
        assert_eq!(row("COM", "12").pending(), Some(("COM".to_string(), 12)));
        assert_eq!(row("Adult Health ", " 3").pending(), Some(("Adult Health".to_string(), 3)));
        assert_eq!(row("# Example: COM", "42").pending(), None);
        assert_eq!(row("", "4").pending(), None);
        assert_eq!(row("COM", "").pending(), None);
        assert_eq!(row("COM", "zero").pending(), None);
        assert_eq!(row("COM", "0").pending(), None);
    }

    #[test]
    fn test_pending_skips_finished_rows() {
        let mut done = row("COM", "12");
        done.no_links = "4".to_string();
        done.no_pdfs = "0".to_string();
        done.no_embeds = "1".to_string();
        assert!(done.pending().is_some());

        done.difficulty = "0.75".to_string();
        assert!(done.pending().is_none());
    }

    #[test]
    fn test_kanban_id_drops_text_marker() {
        let mut r = row("COM", "1");
        r.kanban_id = "'00ab12".to_string();
        assert_eq!(r.kanban_id(), "00ab12");
    }

    #[test]
    fn test_template_has_no_pending_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CSV);

        create_template(&path).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with(
            "kanban_id,title,domain,row,existing_url,no_links,no_pdfs,no_embeds,% difficulty"
        ));
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.pending().is_none()));
    }

    #[test]
    fn test_read_tolerates_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        std::fs::write(&path, "domain,row\nCON,6\nEnterprise\n").unwrap();

        let rows = read_rows(&path).unwrap();

        assert_eq!(rows[0].pending(), Some(("CON".to_string(), 6)));
        assert_eq!(rows[1].domain, "Enterprise");
        assert_eq!(rows[1].pending(), None);
    }
}
