use serde::{Deserialize, Serialize};

use crate::tags::TagMap;

/// Warning attached when a page was parsed but yielded no tags.
pub const NO_TAGS_WARNING: &str = "No tags found";

/// Warning attached to every result produced by the generic fallback extractor.
pub const UNSUPPORTED_SITE_WARNING: &str = "Unsupported site: results may be incomplete";

/// A request to extract tags from a single post page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub target_url: String,
    /// Run the generic extractor instead of failing when no site profile matches.
    #[serde(default)]
    pub allow_unsupported_sites: bool,
    /// Substrings that remove any tag containing them, compared case-insensitively.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl ExtractionRequest {
    pub fn new(target_url: &str) -> Self {
        Self {
            target_url: target_url.to_string(),
            ..Default::default()
        }
    }
}

/// Structured data scraped from one post page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Display name of the matched site profile, or the hostname for unsupported sites.
    pub site_name: String,
    pub tags: TagMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn new(site_name: &str) -> Self {
        Self {
            site_name: site_name.to_string(),
            tags: TagMap::new(),
            image_url: None,
            title: None,
            warnings: Vec::new(),
        }
    }

    #[inline]
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn add_warning(&mut self, warning: &str) {
        if !self.warnings.iter().any(|w| w == warning) {
            self.warnings.push(warning.to_string());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tags::TagCategory;

    #[test]
    fn request_only_needs_target_url() {
        let req: ExtractionRequest =
            serde_json::from_str(r#"{"targetUrl": "https://danbooru.donmai.us/posts/1"}"#)
                .unwrap();
        assert_eq!(req, ExtractionRequest::new("https://danbooru.donmai.us/posts/1"));
    }

    #[test]
    fn result_serializes_camel_case_and_skips_empty_fields() {
        let mut result = ExtractionResult::new("Danbooru");
        result.tags.insert("touhou", TagCategory::Copyright);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["siteName"], "Danbooru");
        assert_eq!(json["tags"]["copyright"], serde_json::json!(["touhou"]));
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("warnings").is_none());

        result.add_warning(NO_TAGS_WARNING);
        result.add_warning(NO_TAGS_WARNING);
        assert_eq!(result.warnings.len(), 1);
    }
}
