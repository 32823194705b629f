//! The configured list of DSM domains.

use std::collections::HashSet;
use std::path::Path;

use serde_json::json;

use crate::domain::entities::DomainConfig;
use crate::error::AppError;
use crate::utils::sitecore::SiteRoots;
use crate::utils::url_normalizer::host_of;

/// Header row of every built-in domain worksheet.
const BUILTIN_HEADER_ROW: usize = 3;

/// Ordered set of domains searched by lookups.
///
/// Order matters: lookups and name resolution both return the first match.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<DomainConfig>,
    roots: SiteRoots,
}

impl DomainRegistry {
    /// Builds a registry from an explicit domain list.
    pub fn new(domains: Vec<DomainConfig>) -> Self {
        let roots = SiteRoots::new(domains.iter().filter_map(|d| {
            match (d.url.as_deref(), d.sitecore_domain_name.as_deref()) {
                (Some(host), Some(site)) => Some((host.to_string(), site.to_string())),
                _ => None,
            }
        }));

        Self { domains, roots }
    }

    /// The domains of the MUSC DSM workbook plus the `News Content` sheet.
    pub fn builtin() -> Self {
        let site = |name: &str, host: &str, sitecore: &str| {
            DomainConfig::new(name)
                .with_header_row(BUILTIN_HEADER_ROW)
                .with_site(host, sitecore)
        };

        Self::new(vec![
            site("Enterprise", "web.musc.edu", "Enterprise").with_aliases(["web"]),
            site("Adult Health", "muschealth.org", "Health").with_aliases(["health", "muschealth"]),
            site("Hollings Cancer", "hollingscancercenter.musc.edu", "Hollings")
                .with_aliases(["hollings", "hcc"]),
            site("Education", "education.musc.edu", "Education"),
            site("Research", "research.musc.edu", "Research"),
            site("Childrens Health", "musckids.org", "Kids").with_aliases(["kids", "musckids"]),
            site("CDM", "dentistry.musc.edu", "Dental Medicine")
                .with_aliases(["dental", "dentistry", "dental medicine"]),
            site("CGS", "gradstudies.musc.edu", "Graduate Studies")
                .with_aliases(["graduate studies", "gradstudies"]),
            site("CHP", "chp.musc.edu", "Health Professions").with_aliases(["health professions"]),
            site("COM", "medicine.musc.edu", "Medicine").with_aliases(["medicine"]),
            site("CON", "nursing.musc.edu", "Nursing").with_aliases(["nursing"]),
            site("COP", "pharmacy.musc.edu", "Pharmacy").with_aliases(["pharmacy"]),
            site("MUSC Giving", "giving.musc.edu", "Giving").with_aliases(["giving"]),
            DomainConfig::new("News Content")
                .with_header_row(0)
                .with_columns("Current URLs", "Path")
                .auxiliary(),
        ])
    }

    /// Loads a JSON array of domain definitions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the file cannot be read or parsed,
    /// is empty, or defines the same `full_name` twice.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::bad_request(
                "Failed to read domains file",
                json!({"path": path.display().to_string(), "reason": e.to_string()}),
            )
        })?;

        let domains: Vec<DomainConfig> = serde_json::from_str(&content).map_err(|e| {
            AppError::bad_request(
                "Invalid domains file",
                json!({"path": path.display().to_string(), "reason": e.to_string()}),
            )
        })?;

        Self::validated(domains)
    }

    /// Builds a registry after checking names are present and unique.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] on an empty list, a blank name, or a
    /// duplicated `full_name` (compared case-insensitively).
    pub fn validated(domains: Vec<DomainConfig>) -> Result<Self, AppError> {
        if domains.is_empty() {
            return Err(AppError::bad_request(
                "Domain list is empty",
                json!({"hint": "Define at least one domain"}),
            ));
        }

        let mut seen = HashSet::new();
        for domain in &domains {
            let key = domain.full_name.trim().to_lowercase();
            if key.is_empty() {
                return Err(AppError::bad_request(
                    "Domain full_name must not be empty",
                    json!({}),
                ));
            }
            if !seen.insert(key) {
                return Err(AppError::bad_request(
                    "Duplicate domain full_name",
                    json!({"full_name": domain.full_name}),
                ));
            }
        }

        Ok(Self::new(domains))
    }

    /// All domains, auxiliary ones included, in search order.
    pub fn all(&self) -> &[DomainConfig] {
        &self.domains
    }

    /// Domains a user may `load` by name.
    pub fn loadable(&self) -> impl Iterator<Item = &DomainConfig> {
        self.domains.iter().filter(|d| !d.auxiliary)
    }

    /// Resolves a user-typed domain name or alias (case-insensitive, first match).
    ///
    /// Auxiliary domains are never returned.
    pub fn find(&self, name: &str) -> Option<&DomainConfig> {
        self.loadable().find(|d| d.answers_to(name))
    }

    pub fn site_roots(&self) -> &SiteRoots {
        &self.roots
    }

    /// Returns true when the URL points at one of the configured legacy hosts.
    pub fn is_internal_url(&self, url: &str) -> bool {
        match host_of(url) {
            Some(host) => self
                .domains
                .iter()
                .filter_map(|d| d.url.as_deref())
                .any(|h| h.eq_ignore_ascii_case(&host)),
            None => false,
        }
    }
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
