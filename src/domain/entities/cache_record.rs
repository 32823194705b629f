//! Persisted page-data cache documents.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::page_data::PageData;

/// Context a cache file was written in.
///
/// Every field is optional on read: files written by older tooling may carry
/// rows as numbers, sidebar flags as strings, or omit fields altogether.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheMetadata {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub domain: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub row: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub selector: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub include_sidebar: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub kanban_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub cache_filename: Option<String>,
}

impl CacheMetadata {
    /// Returns true when no context was recorded at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// On-disk envelope written for every new cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub metadata: CacheMetadata,
    #[serde(default)]
    pub page_data: PageData,
}

/// A cache file as read back from disk.
///
/// `metadata` is `None` for legacy files whose top-level object is the page
/// data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub metadata: Option<CacheMetadata>,
    pub page_data: PageData,
}

impl CacheRecord {
    /// Interprets a parsed JSON document as either the envelope or the legacy layout.
    ///
    /// Returns `None` when the document is not an object or its parts do not
    /// have the expected shape.
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };

        if object.contains_key("metadata") || object.contains_key("page_data") {
            let metadata = match object.remove("metadata") {
                Some(Value::Null) | None => None,
                Some(raw) => Some(serde_json::from_value::<CacheMetadata>(raw).ok()?),
            };
            let page_data = match object.remove("page_data") {
                Some(Value::Null) | None => PageData::default(),
                Some(raw) => serde_json::from_value::<PageData>(raw).ok()?,
            };
            return Some(Self {
                metadata,
                page_data,
            });
        }

        let page_data = serde_json::from_value::<PageData>(Value::Object(object)).ok()?;
        Some(Self {
            metadata: None,
            page_data,
        })
    }

    /// Returns metadata only when it carries at least one field.
    pub fn usable_metadata(&self) -> Option<&CacheMetadata> {
        self.metadata.as_ref().filter(|m| !m.is_empty())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => is_truthy(&s),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

/// Interprets the usual textual spellings of "yes".
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_is_parsed() {
        let record = CacheRecord::from_json(json!({
            "metadata": {"url": "http://a.com", "domain": "COM", "row": "7", "include_sidebar": true},
            "page_data": {"links": [["A", "http://a.com/x", "200"]]}
        }))
        .unwrap();

        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.domain.as_deref(), Some("COM"));
        assert_eq!(metadata.row.as_deref(), Some("7"));
        assert!(metadata.include_sidebar);
        assert_eq!(record.page_data.links.len(), 1);
    }

    #[test]
    fn test_legacy_layout_has_no_metadata() {
        let record = CacheRecord::from_json(json!({
            "links": [["A", "http://a.com/x", "200"]],
            "pdfs": []
        }))
        .unwrap();

        assert!(record.metadata.is_none());
        assert_eq!(record.page_data.links[0].href, "http://a.com/x");
    }

    #[test]
    fn test_lenient_metadata_values() {
        let metadata: CacheMetadata = serde_json::from_value(json!({
            "row": 12,
            "include_sidebar": "yes",
            "domain": "",
            "url": null
        }))
        .unwrap();

        assert_eq!(metadata.row.as_deref(), Some("12"));
        assert!(metadata.include_sidebar);
        assert!(metadata.domain.is_none());
        assert!(metadata.url.is_none());
    }

    #[test]
    fn test_empty_metadata_is_not_usable() {
        let record = CacheRecord::from_json(json!({"metadata": {}, "page_data": {}})).unwrap();
        assert!(record.metadata.as_ref().unwrap().is_empty());
        assert!(record.usable_metadata().is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(CacheRecord::from_json(json!([1, 2, 3])).is_none());
        assert!(CacheRecord::from_json(json!("text")).is_none());
    }

    #[test]
    fn test_malformed_page_data_is_rejected() {
        assert!(
            CacheRecord::from_json(json!({"metadata": {"url": "x"}, "page_data": {"links": 5}}))
                .is_none()
        );
    }

    #[test]
    fn test_is_truthy() {
        for yes in ["true", "1", "YES", " on "] {
            assert!(is_truthy(yes));
        }
        for no in ["false", "0", "", "maybe"] {
            assert!(!is_truthy(no));
        }
    }
}
