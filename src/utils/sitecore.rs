//! Sitecore site-root mapping and breadcrumb rendering.

use std::collections::HashMap;

use super::url_normalizer::{ensure_scheme, host_of};

/// Maps legacy hostnames to the name of their site in the new CMS.
///
/// Hostnames missing from the table fall back to their first label, so
/// `unknown.musc.edu` becomes `unknown`.
#[derive(Debug, Clone, Default)]
pub struct SiteRoots {
    by_host: HashMap<String, String>,
}

impl SiteRoots {
    /// Builds the table from `(hostname, site name)` pairs.
    ///
    /// Hostnames are matched case-insensitively. When a hostname appears
    /// twice the first entry wins.
    pub fn new<I, H, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (H, S)>,
        H: AsRef<str>,
        S: Into<String>,
    {
        let mut by_host = HashMap::new();
        for (host, site) in entries {
            by_host
                .entry(host.as_ref().trim().to_ascii_lowercase())
                .or_insert_with(|| site.into());
        }
        Self { by_host }
    }

    /// Returns the site-root name for a legacy page URL.
    pub fn root_for(&self, existing_url: &str) -> String {
        let host = host_of(&ensure_scheme(existing_url)).unwrap_or_default();

        match self.by_host.get(&host) {
            Some(site) => site.clone(),
            None => host.split('.').next().unwrap_or_default().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}

/// Splits a slash-delimited path into its non-empty segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the path segments of a URL, ignoring query and fragment.
pub fn url_path_segments(url: &str) -> Vec<String> {
    match url::Url::parse(&ensure_scheme(url)) {
        Ok(parsed) => path_segments(parsed.path()),
        Err(_) => Vec::new(),
    }
}

/// Renders a site hierarchy as a breadcrumb block.
///
/// # Output Format
///
/// ```text
/// Enterprise (Sites)
///  > new
///  > about-us
/// ```
pub fn format_hierarchy(root: &str, segments: &[String]) -> String {
    let mut out = format!("{root} (Sites)");
    for segment in segments {
        out.push_str("\n > ");
        out.push_str(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> SiteRoots {
        SiteRoots::new([
            ("web.musc.edu", "Enterprise"),
            ("medicine.musc.edu", "Medicine"),
        ])
    }

    #[test]
    fn test_root_for_known_host() {
        assert_eq!(roots().root_for("http://web.musc.edu/about"), "Enterprise");
    }

    #[test]
    fn test_root_for_is_case_insensitive() {
        assert_eq!(roots().root_for("https://MEDICINE.musc.edu/x"), "Medicine");
    }

    #[test]
    fn test_root_for_unknown_host_uses_first_label() {
        assert_eq!(roots().root_for("https://library.musc.edu/x"), "library");
    }

    #[test]
    fn test_root_for_without_scheme() {
        assert_eq!(roots().root_for("web.musc.edu/about"), "Enterprise");
    }

    #[test]
    fn test_root_for_garbage_is_empty() {
        assert_eq!(roots().root_for(""), "");
    }

    #[test]
    fn test_first_entry_wins() {
        let roots = SiteRoots::new([("a.edu", "First"), ("A.edu", "Second")]);
        assert_eq!(roots.root_for("http://a.edu"), "First");
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(path_segments("/new/about-us/"), vec!["new", "about-us"]);
        assert!(path_segments("").is_empty());
        assert!(path_segments("///").is_empty());
    }

    #[test]
    fn test_url_path_segments() {
        assert_eq!(
            url_path_segments("http://web.musc.edu/about/leadership?x=1#top"),
            vec!["about", "leadership"]
        );
    }

    #[test]
    fn test_format_hierarchy() {
        let segments = vec!["new".to_string(), "about-us".to_string()];
        assert_eq!(
            format_hierarchy("Enterprise", &segments),
            "Enterprise (Sites)\n > new\n > about-us"
        );
    }

    #[test]
    fn test_format_hierarchy_root_only() {
        assert_eq!(format_hierarchy("Kids", &[]), "Kids (Sites)");
    }
}
