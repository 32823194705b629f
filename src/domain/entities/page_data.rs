//! Scraped page content: links, PDFs and embeds found on a legacy page.

use serde::{Deserialize, Serialize};

/// A hyperlink found on a page.
///
/// Stored on disk as a `[text, href, status]` triple so cache files stay
/// compatible with those written by earlier tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct PageLink {
    pub text: String,
    pub href: String,
    /// HTTP status of the target as a string; `"0"` when it could not be checked.
    pub status: String,
}

impl PageLink {
    pub fn new(text: impl Into<String>, href: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
            status: status.into(),
        }
    }

    /// Returns true for `tel:` and `mailto:` links, which need no DSM mapping.
    pub fn is_contact(&self) -> bool {
        self.href.starts_with("tel:") || self.href.starts_with("mailto:")
    }

    pub fn is_pdf(&self) -> bool {
        self.href.to_ascii_lowercase().ends_with(".pdf")
    }
}

impl From<(String, String, String)> for PageLink {
    fn from((text, href, status): (String, String, String)) -> Self {
        Self { text, href, status }
    }
}

impl From<PageLink> for (String, String, String) {
    fn from(link: PageLink) -> Self {
        (link.text, link.href, link.status)
    }
}

/// An embedded media item, stored as a `[kind, title, src]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct PageEmbed {
    pub kind: String,
    pub title: String,
    pub src: String,
}

impl PageEmbed {
    pub fn new(kind: impl Into<String>, title: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            src: src.into(),
        }
    }
}

impl From<(String, String, String)> for PageEmbed {
    fn from((kind, title, src): (String, String, String)) -> Self {
        Self { kind, title, src }
    }
}

impl From<PageEmbed> for (String, String, String) {
    fn from(embed: PageEmbed) -> Self {
        (embed.kind, embed.title, embed.src)
    }
}

/// Everything extracted from one legacy page.
///
/// Sidebar lists are empty unless the page was scraped with sidebar
/// inclusion enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageData {
    pub links: Vec<PageLink>,
    pub pdfs: Vec<PageLink>,
    pub embeds: Vec<PageEmbed>,
    pub sidebar_links: Vec<PageLink>,
    pub sidebar_pdfs: Vec<PageLink>,
    pub sidebar_embeds: Vec<PageEmbed>,
    pub meta_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts of extracted items per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContentCounts {
    pub links: usize,
    pub pdfs: usize,
    pub embeds: usize,
}

impl ContentCounts {
    pub fn is_empty(&self) -> bool {
        self.links == 0 && self.pdfs == 0 && self.embeds == 0
    }
}

/// Main-content and sidebar counts for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageSummary {
    pub main: ContentCounts,
    pub sidebar: ContentCounts,
}

impl PageSummary {
    pub fn total(&self) -> ContentCounts {
        ContentCounts {
            links: self.main.links + self.sidebar.links,
            pdfs: self.main.pdfs + self.sidebar.pdfs,
            embeds: self.main.embeds + self.sidebar.embeds,
        }
    }
}

impl PageData {
    pub fn summary(&self) -> PageSummary {
        PageSummary {
            main: ContentCounts {
                links: self.links.len(),
                pdfs: self.pdfs.len(),
                embeds: self.embeds.len(),
            },
            sidebar: ContentCounts {
                links: self.sidebar_links.len(),
                pdfs: self.sidebar_pdfs.len(),
                embeds: self.sidebar_embeds.len(),
            },
        }
    }

    pub fn has_sidebar_content(&self) -> bool {
        !self.summary().sidebar.is_empty()
    }

    /// Iterates over every link and PDF, main content first, then sidebar.
    pub fn all_links(&self) -> impl Iterator<Item = &PageLink> {
        self.links
            .iter()
            .chain(&self.pdfs)
            .chain(&self.sidebar_links)
            .chain(&self.sidebar_pdfs)
    }

    /// Share of links that are not `tel:`/`mailto:` (0.0 when there are none).
    pub fn difficulty(&self) -> f64 {
        difficulty_of(self.links.iter().chain(&self.sidebar_links))
    }

    /// [`difficulty`](Self::difficulty) over the main content links only.
    pub fn main_difficulty(&self) -> f64 {
        difficulty_of(self.links.iter())
    }
}

fn difficulty_of<'a>(links: impl Iterator<Item = &'a PageLink>) -> f64 {
    let (total, easy) = links.fold((0usize, 0usize), |(total, easy), link| {
        (total + 1, easy + usize::from(link.is_contact()))
    });
    if total == 0 {
        return 0.0;
    }

    (total - easy) as f64 / total as f64
}
