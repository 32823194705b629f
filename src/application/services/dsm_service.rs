//! DSM lookups: where does a legacy URL land in the new site?

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::{DomainConfig, DsmMatch, LookupResult, ProposedHierarchy};
use crate::domain::registry::DomainRegistry;
use crate::error::AppError;
use crate::infrastructure::spreadsheet::{SheetTable, Workbook, count_http};
use crate::utils::sitecore::{path_segments, url_path_segments};
use crate::utils::url_normalizer::normalize_for_comparison;

/// A DSM row loaded into the session by `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedRow {
    pub domain: String,
    /// 1-based row number as shown in the spreadsheet.
    pub sheet_row: usize,
    /// Zero-based data row index below the header.
    pub row_index: usize,
    pub existing_url: String,
    pub proposed_path: String,
    /// The existing-URL cell holds more than one URL.
    pub multiple_urls: bool,
}

/// Resolves URLs against the DSM and loads rows from it.
pub struct DsmService {
    registry: Arc<DomainRegistry>,
}

impl DsmService {
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Parses every domain worksheet once, for repeated lookups.
    ///
    /// Domains whose worksheet cannot be parsed are skipped with a warning.
    pub fn index<'a>(&'a self, workbook: &Workbook) -> DsmIndex<'a> {
        let tables = self
            .registry
            .all()
            .iter()
            .filter_map(|domain| {
                match workbook.parse(domain.worksheet(), domain.worksheet_header_row) {
                    Ok(table) => Some((domain, table)),
                    Err(e) => {
                        warn!("Skipping domain '{}' during DSM scan: {}", domain.full_name, e);
                        None
                    }
                }
            })
            .collect();

        DsmIndex {
            service: self,
            tables,
        }
    }

    /// Finds the first DSM row, across all domains, whose existing-URL cell
    /// contains `url`.
    pub fn lookup(&self, url: &str, workbook: &Workbook) -> LookupResult {
        self.index(workbook).lookup(url)
    }

    /// Loads the row shown as `sheet_row` in the worksheet of `domain_name`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the domain is unknown, its worksheet
    /// is missing, or the row has no existing URL.
    /// Returns [`AppError::Validation`] if `sheet_row` lies above the first data row.
    pub fn load_row(
        &self,
        domain_name: &str,
        sheet_row: usize,
        workbook: &Workbook,
    ) -> Result<LoadedRow, AppError> {
        let (domain, table, row_index) = self.locate(domain_name, sheet_row, workbook)?;

        let existing_url = table.existing_url(row_index, &domain.existing_url_col_name);
        if existing_url.is_empty() {
            return Err(AppError::not_found(
                "Could not find URL for row",
                json!({"domain": domain.full_name, "row": sheet_row}),
            ));
        }

        let raw = table.column_value(row_index, &domain.existing_url_col_name);
        let proposed_path = table.proposed_url(row_index, &domain.proposed_url_col_name);

        debug!(
            "Loaded {} row {} (index {}): {}",
            domain.full_name, sheet_row, row_index, existing_url
        );

        Ok(LoadedRow {
            domain: domain.full_name.clone(),
            sheet_row,
            row_index,
            existing_url,
            proposed_path,
            multiple_urls: count_http(&raw) > 1,
        })
    }

    /// Returns every named column of a row as `(header, value)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load_row`], plus [`AppError::NotFound`] when the row
    /// lies past the end of the worksheet.
    pub fn row_data(
        &self,
        domain_name: &str,
        sheet_row: usize,
        workbook: &Workbook,
    ) -> Result<Vec<(String, String)>, AppError> {
        let (domain, table, row_index) = self.locate(domain_name, sheet_row, workbook)?;

        table.row_values(row_index).ok_or_else(|| {
            AppError::not_found(
                "Row is past the end of the worksheet",
                json!({"domain": domain.full_name, "row": sheet_row, "rows": table.len()}),
            )
        })
    }

    /// Breadcrumb of a legacy URL: its site root plus its path segments.
    pub fn existing_hierarchy(&self, url: &str) -> ProposedHierarchy {
        ProposedHierarchy {
            root: self.registry.site_roots().root_for(url),
            segments: url_path_segments(url),
        }
    }

    /// Breadcrumb of a proposed path, rooted at the site of `existing_url`.
    pub fn proposed_hierarchy(&self, existing_url: &str, proposed_path: &str) -> ProposedHierarchy {
        ProposedHierarchy {
            root: self.registry.site_roots().root_for(existing_url),
            segments: path_segments(proposed_path),
        }
    }

    fn locate<'a>(
        &'a self,
        domain_name: &str,
        sheet_row: usize,
        workbook: &Workbook,
    ) -> Result<(&'a DomainConfig, SheetTable, usize), AppError> {
        let domain = self.registry.find(domain_name).ok_or_else(|| {
            AppError::not_found(
                "Domain not found",
                json!({
                    "domain": domain_name,
                    "available": self.registry.loadable().map(|d| d.full_name.as_str()).collect::<Vec<_>>(),
                }),
            )
        })?;

        let row_index = domain.index_for_sheet_row(sheet_row).ok_or_else(|| {
            AppError::bad_request(
                "Row is above the first data row",
                json!({"row": sheet_row, "first_data_row": domain.row_offset()}),
            )
        })?;

        let table = workbook.parse(domain.worksheet(), domain.worksheet_header_row)?;
        Ok((domain, table, row_index))
    }
}

/// Worksheets parsed once for a batch of lookups.
pub struct DsmIndex<'a> {
    service: &'a DsmService,
    tables: Vec<(&'a DomainConfig, SheetTable)>,
}

impl DsmIndex<'_> {
    /// Finds the first matching row in domain order.
    ///
    /// The URL must appear as a whole token of the existing-URL cell, with
    /// whitespace, `,` or `;` as separators, ignoring case, a fragment and a
    /// trailing slash.
    pub fn lookup(&self, url: &str) -> LookupResult {
        let Some(pattern) = token_pattern(url) else {
            debug!("Nothing to look up for '{}'", url);
            return LookupResult::NotFound;
        };

        for (domain, table) in &self.tables {
            for row_index in 0..table.len() {
                let cell = table.column_value(row_index, &domain.existing_url_col_name);
                let Some(captures) = pattern.captures(&cell) else {
                    continue;
                };
                let existing_url = captures
                    .get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let proposed_url = table.proposed_url(row_index, &domain.proposed_url_col_name);
                let proposed_hierarchy = self
                    .service
                    .proposed_hierarchy(&existing_url, &proposed_url);

                debug!(
                    "DSM match for {} in {} row {}",
                    url,
                    domain.full_name,
                    domain.sheet_row_for_index(row_index)
                );

                return LookupResult::Found(DsmMatch {
                    domain: domain.full_name.clone(),
                    row_index,
                    sheet_row: domain.sheet_row_for_index(row_index),
                    existing_url,
                    proposed_url,
                    proposed_hierarchy,
                });
            }
        }

        debug!("No DSM match for {}", url);
        LookupResult::NotFound
    }

    /// Number of worksheets that parsed successfully.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Builds the whole-token pattern for a URL; `None` for a blank URL.
fn token_pattern(url: &str) -> Option<Regex> {
    let normalized = normalize_for_comparison(url);
    if normalized.is_empty() {
        return None;
    }

    let pattern = format!(r"(?:^|[\s,;])({}/?)(?:[\s,;]|$)", regex::escape(&normalized));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("Could not build lookup pattern for '{}': {}", url, e);
            None
        }
    }
}
