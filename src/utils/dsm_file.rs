//! Discovery of the most recent DSM workbook on disk.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static DSM_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^dsm-(\d{2})(\d{2})\.xlsx$").expect("valid regex"));

/// Finds the newest `dsm-MMDD.xlsx` workbook in `dir`.
///
/// Files are ranked by `(month, day)` parsed from the name; anything not
/// matching the pattern is ignored. Returns `None` when the directory is
/// unreadable or holds no candidate.
pub fn find_latest_dsm_file(dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot read DSM directory {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut latest: Option<((u32, u32), PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = DSM_FILE_NAME.captures(name) else {
            continue;
        };
        let (Ok(month), Ok(day)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
            debug!("Skipping invalid DSM filename: {}", name);
            continue;
        };

        let date = (month, day);
        if latest.as_ref().is_none_or(|(best, _)| date > *best) {
            debug!("New latest DSM candidate: {} (date {:?})", path.display(), date);
            latest = Some((date, path));
        }
    }

    latest.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_picks_latest_month_and_day() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "dsm-0612.xlsx");
        touch(dir.path(), "dsm-0701.xlsx");
        touch(dir.path(), "dsm-0630.xlsx");

        let latest = find_latest_dsm_file(dir.path()).unwrap();
        assert_eq!(latest.file_name().unwrap(), "dsm-0701.xlsx");
    }

    #[test]
    fn test_ignores_non_matching_names() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "dsm-latest.xlsx");
        touch(dir.path(), "dsm-0612.xlsx.bak");
        touch(dir.path(), "notes.txt");

        assert!(find_latest_dsm_file(dir.path()).is_none());
    }

    #[test]
    fn test_missing_directory() {
        assert!(find_latest_dsm_file(Path::new("/definitely/not/here")).is_none());
    }
}
