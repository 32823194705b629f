//! Domain entity representing one organizational section of the DSM.

use serde::{Deserialize, Serialize};

/// Column holding the legacy page URL unless a domain overrides it.
pub const DEFAULT_EXISTING_URL_COLUMN: &str = "EXISTING URL";
/// Column holding the destination path unless a domain overrides it.
pub const DEFAULT_PROPOSED_URL_COLUMN: &str = "PROPOSED URL";
/// Header row used when a domain definition does not specify one.
pub const DEFAULT_HEADER_ROW: usize = 4;

/// An organizational domain with its own DSM worksheet.
///
/// Each domain owns one worksheet of the spreadsheet and usually one legacy
/// hostname. The `full_name` is the canonical label shown to users; any of the
/// `aliases` may be typed instead.
///
/// Spreadsheet rows are addressed two ways:
///
/// - a **sheet row**: the 1-based row number a person sees in Excel
/// - a **row index**: the 0-based position among data rows below the header
///
/// They differ by [`DomainConfig::row_offset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub full_name: String,
    #[serde(default)]
    pub worksheet_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Zero-based row index of the column headers within the worksheet.
    #[serde(default = "default_header_row")]
    pub worksheet_header_row: usize,
    #[serde(default = "default_existing_url_column")]
    pub existing_url_col_name: String,
    #[serde(default = "default_proposed_url_column")]
    pub proposed_url_col_name: String,
    /// Legacy hostname served by this domain (e.g. `web.musc.edu`).
    #[serde(default)]
    pub url: Option<String>,
    /// Name of the matching site in the new CMS.
    #[serde(default)]
    pub sitecore_domain_name: Option<String>,
    /// Auxiliary worksheets are searched by lookups but cannot be loaded by name.
    #[serde(default)]
    pub auxiliary: bool,
}

fn default_header_row() -> usize {
    DEFAULT_HEADER_ROW
}

fn default_existing_url_column() -> String {
    DEFAULT_EXISTING_URL_COLUMN.to_string()
}

fn default_proposed_url_column() -> String {
    DEFAULT_PROPOSED_URL_COLUMN.to_string()
}

impl DomainConfig {
    /// Creates a domain whose worksheet is named after it.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let domain = DomainConfig::new("Enterprise")
    ///     .with_header_row(3)
    ///     .with_site("web.musc.edu", "Enterprise");
    /// ```
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            worksheet_name: None,
            aliases: Vec::new(),
            worksheet_header_row: DEFAULT_HEADER_ROW,
            existing_url_col_name: default_existing_url_column(),
            proposed_url_col_name: default_proposed_url_column(),
            url: None,
            sitecore_domain_name: None,
            auxiliary: false,
        }
    }

    pub fn with_worksheet(mut self, worksheet_name: impl Into<String>) -> Self {
        self.worksheet_name = Some(worksheet_name.into());
        self
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.worksheet_header_row = header_row;
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_columns(mut self, existing: impl Into<String>, proposed: impl Into<String>) -> Self {
        self.existing_url_col_name = existing.into();
        self.proposed_url_col_name = proposed.into();
        self
    }

    pub fn with_site(mut self, host: impl Into<String>, sitecore_name: impl Into<String>) -> Self {
        self.url = Some(host.into());
        self.sitecore_domain_name = Some(sitecore_name.into());
        self
    }

    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }

    /// Returns the worksheet backing this domain.
    pub fn worksheet(&self) -> &str {
        self.worksheet_name.as_deref().unwrap_or(&self.full_name)
    }

    /// Number of sheet rows preceding the first data row, plus one for 1-based numbering.
    pub fn row_offset(&self) -> usize {
        self.worksheet_header_row + 2
    }

    /// Converts a 1-based sheet row into a 0-based data row index.
    ///
    /// Returns `None` for rows at or above the header.
    pub fn index_for_sheet_row(&self, sheet_row: usize) -> Option<usize> {
        sheet_row.checked_sub(self.row_offset())
    }

    /// Converts a 0-based data row index back into the 1-based sheet row.
    pub fn sheet_row_for_index(&self, index: usize) -> usize {
        index + self.row_offset()
    }

    /// Returns true if `name` is the full name or one of the aliases (case-insensitive).
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        self.full_name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.trim().eq_ignore_ascii_case(name))
    }
}
