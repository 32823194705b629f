//! Result of resolving a URL against the DSM.

use serde::Serialize;

use crate::utils::sitecore::format_hierarchy;

/// Destination of a page in the new site, as a root plus path segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedHierarchy {
    pub root: String,
    pub segments: Vec<String>,
}

impl ProposedHierarchy {
    /// Multi-line breadcrumb, see [`format_hierarchy`].
    pub fn render(&self) -> String {
        format_hierarchy(&self.root, &self.segments)
    }

    /// Single-line form: `Enterprise / new / about-us`.
    pub fn inline(&self) -> String {
        std::iter::once(self.root.as_str())
            .chain(self.segments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn is_root_level(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A DSM row whose existing URL matched the looked-up link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DsmMatch {
    pub domain: String,
    /// Zero-based data row index within the worksheet.
    pub row_index: usize,
    /// The 1-based row number as shown in the spreadsheet.
    pub sheet_row: usize,
    pub existing_url: String,
    pub proposed_url: String,
    pub proposed_hierarchy: ProposedHierarchy,
}

/// Outcome of a DSM lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupResult {
    Found(DsmMatch),
    NotFound,
}

impl LookupResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn as_match(&self) -> Option<&DsmMatch> {
        match self {
            Self::Found(m) => Some(m),
            Self::NotFound => None,
        }
    }
}
