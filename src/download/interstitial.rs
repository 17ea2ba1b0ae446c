//! Confirmation-page detection and download target extraction.
//!
//! Some content URLs answer with an HTML page (for example a "file too large
//! to scan for viruses" warning) instead of the file. The page carries a form
//! whose submission yields the real content. [`InterstitialExtractor`] isolates
//! both the classification of a response and the scraping of that page so the
//! fetcher never depends on a concrete document structure.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Form id used by Google Drive confirmation pages.
pub const DEFAULT_DOWNLOAD_FORM_ID: &str = "download-form";

static FORM_TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?is)<form\b[^>]*>"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
    )
});
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"&#(?:[xX]([0-9A-Fa-f]+)|([0-9]+));"));

/// Compiles a regex at static init; panics on invalid pattern.
fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Classifies responses and extracts the real download endpoint from
/// confirmation pages.
pub trait InterstitialExtractor: Send + Sync + Debug {
    /// Returns true when a response with this content type is a confirmation
    /// page rather than file content.
    fn is_interstitial(&self, content_type: Option<&str>) -> bool;

    /// Locates the download target in `html`, resolving relative targets
    /// against `page_url`. `None` means the page lacks the expected form.
    fn extract_target(&self, html: &str, page_url: &Url) -> Option<Url>;
}

/// Finds the `<form id="download-form">` element and returns its `action`.
#[derive(Debug, Clone)]
pub struct DownloadFormExtractor {
    form_id: String,
}

impl Default for DownloadFormExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNLOAD_FORM_ID)
    }
}

impl DownloadFormExtractor {
    /// Creates an extractor matching forms with the given `id` attribute.
    #[must_use]
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
        }
    }
}

impl InterstitialExtractor for DownloadFormExtractor {
    fn is_interstitial(&self, content_type: Option<&str>) -> bool {
        content_type.is_some_and(|value| value.to_ascii_lowercase().contains("text/html"))
    }

    fn extract_target(&self, html: &str, page_url: &Url) -> Option<Url> {
        let attrs = FORM_TAG_RE
            .find_iter(html)
            .map(|tag| parse_attributes(tag.as_str()))
            .find(|attrs| attrs.get("id").is_some_and(|id| *id == self.form_id))?;

        // A form without an action submits to the page itself.
        let action = attrs
            .get("action")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty());
        match action {
            Some(action) => page_url.join(action).ok(),
            None => Some(page_url.clone()),
        }
    }
}

/// Parses the attributes of one start tag. Names are lowercased, values are
/// entity-decoded; the first occurrence of a name wins.
fn parse_attributes(tag: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for caps in ATTR_RE.captures_iter(tag) {
        let Some(name) = caps.get(1) else { continue };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attrs
            .entry(name.as_str().to_ascii_lowercase())
            .or_insert_with(|| decode_html_entities(value));
    }
    attrs
}

/// Decodes the entities that show up in attribute values (`&amp;` in query
/// strings, numeric escapes for `=` and quotes).
fn decode_html_entities(value: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(value, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |ch| ch.to_string())
    });
    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
