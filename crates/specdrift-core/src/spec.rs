//! Specification JSON loading, fetching and writing

use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::Path;

use crate::rules::RuleNode;

/// Where the published specification snapshot lives
pub const DEFAULT_SPEC_URL: &str =
    "https://raw.githubusercontent.com/open-feature/spec/main/specification.json";

/// File name of the cached (or generated) specification snapshot
pub const SPEC_FILE_NAME: &str = "specification.json";

/// A rule as it appears in specification JSON
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct RuleObject {
    /// Heading phrase identifying the rule (e.g. "Requirement 1.1.1")
    pub id: String,
    /// Slug of `id`, unique across the specification
    pub machine_id: String,
    /// Rule text, with normative keywords still emphasized upstream
    pub content: String,
    /// The normative keyword, if the rule has one
    #[facet(rename = "RFC 2119 keyword", default)]
    pub keyword: Option<String>,
    /// Nested rules (conditional requirements under a condition, ...)
    #[facet(default)]
    pub children: Vec<RuleObject>,
}

impl From<&RuleNode> for RuleObject {
    fn from(node: &RuleNode) -> Self {
        Self {
            id: node.id.clone(),
            machine_id: node.machine_id.clone(),
            content: node.content.clone(),
            keyword: node.keyword.map(|k| k.as_str().to_string()),
            children: node.children.iter().map(RuleObject::from).collect(),
        }
    }
}

/// A specification document (`{"rules": [...]}`)
#[derive(Debug, Clone, Default, PartialEq, Facet)]
pub struct SpecDocument {
    pub rules: Vec<RuleObject>,
}

impl SpecDocument {
    /// Wrap extracted rules in a document
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a RuleNode>) -> Self {
        Self {
            rules: rules.into_iter().map(RuleObject::from).collect(),
        }
    }

    /// Parse a specification from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json)
            .map_err(|e| eyre::eyre!("Failed to parse specification JSON: {}", e.message()))
    }

    /// Load a specification from a local file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read specification from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse specification from {}", path.display()))
    }

    /// Download the raw specification body from a URL
    #[cfg(feature = "fetch")]
    pub fn fetch_raw(url: &str) -> Result<String> {
        let mut response = ureq::get(url)
            .call()
            .wrap_err_with(|| format!("Failed to fetch specification from {}", url))?;

        response
            .body_mut()
            .read_to_string()
            .wrap_err_with(|| format!("Failed to read response body from {}", url))
    }

    /// Load the cached snapshot at `cache`, downloading it from `url` first
    /// when it is missing or when `refresh` is set.
    ///
    /// The downloaded body is written to `cache` verbatim before parsing.
    #[cfg(feature = "fetch")]
    pub fn load_or_fetch(cache: impl AsRef<Path>, url: &str, refresh: bool) -> Result<Self> {
        let cache = cache.as_ref();
        if cache.exists() && !refresh {
            tracing::debug!(path = %cache.display(), "using cached specification");
            return Self::load(cache);
        }

        tracing::info!(url, "downloading specification");
        let body = Self::fetch_raw(url)?;
        std::fs::write(cache, &body)
            .wrap_err_with(|| format!("Failed to write specification to {}", cache.display()))?;
        Self::from_json(&body)
            .wrap_err_with(|| format!("Failed to parse specification from {}", url))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> String {
        facet_json::to_string(self)
    }

    /// Write the document as JSON
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))
    }

    /// Number of top-level rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
