//! Inline rule markers in implementation source
//!
//! Implementations quote the rules they cover in comments. With the default
//! syntax a marker reads:
//!
//! ```text
//! // spec:4.3.7:The error hook MUST run when errors are encountered in the
//! // before stage, the after stage or during flag resolution.:end
//! ```
//!
//! A marker may run over several comment lines; the comment prefix and the
//! line breaks are removed before the number and text are picked out.
//!
//! ```
//! use specdrift_core::{MarkerConfig, RepoRuleMap, MemorySources, Sources};
//!
//! let config = MarkerConfig::inline("rs", "//").unwrap();
//! let repo = MemorySources::new()
//!     .add("hooks.rs", "// spec:4.3.6:The after stage **MUST** run.:end")
//!     .extract(&config)
//!     .unwrap();
//!
//! assert_eq!(repo.get("4.3.6"), Some("The after stage MUST run."));
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::MarkerConfig;
use crate::normalize::demarkdown;
use crate::skip::SkipReason;

static REPEATED_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("space run regex"));

/// One rule quoted in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Dotted rule number (e.g. "4.3.6")
    pub number: String,
    /// Quoted rule text, normalized for comparison
    pub text: String,
}

/// A rule number quoted by more than one marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMarker {
    pub number: String,
    /// File of the marker that was overwritten
    pub first: PathBuf,
    /// File of the marker that won
    pub second: PathBuf,
}

/// Rule text keyed by dotted rule number, as quoted by an implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoRuleMap {
    pub rules: BTreeMap<String, String>,
    /// Numbers quoted more than once; the later marker wins
    pub duplicates: Vec<DuplicateMarker>,
    origins: BTreeMap<String, PathBuf>,
}

impl RepoRuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the markers of one source file.
    ///
    /// Files must be added in a stable order: a number already present is
    /// overwritten, logged and recorded in [`RepoRuleMap::duplicates`].
    pub fn add_file(&mut self, config: &MarkerConfig, path: &Path, content: &str) {
        for marker in find_markers(config, path, content) {
            self.insert(path, marker);
        }
    }

    /// Record a single marker found in `path`
    pub fn insert(&mut self, path: &Path, marker: Marker) {
        if let Some(first) = self.origins.get(&marker.number) {
            tracing::warn!(
                number = %marker.number,
                first = %first.display(),
                second = %path.display(),
                "rule quoted more than once, keeping the later marker"
            );
            self.duplicates.push(DuplicateMarker {
                number: marker.number.clone(),
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        self.origins.insert(marker.number.clone(), path.to_path_buf());
        self.rules.insert(marker.number, marker.text);
    }

    /// Text quoted for the given rule number
    pub fn get(&self, number: &str) -> Option<&str> {
        self.rules.get(number).map(String::as_str)
    }

    /// File the winning marker for a number came from
    pub fn origin(&self, number: &str) -> Option<&Path> {
        self.origins.get(number).map(PathBuf::as_path)
    }

    pub fn contains(&self, number: &str) -> bool {
        self.rules.contains_key(number)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RepoRuleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }
}

/// Find every well-formed marker in a source file.
///
/// Malformed markers are logged and skipped.
pub fn find_markers(config: &MarkerConfig, path: &Path, content: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    for caps in config.multiline.captures_iter(content) {
        let span = first_group(&caps);
        match parse_marker(config, span) {
            Ok(marker) => markers.push(marker),
            Err(reason) => {
                tracing::warn!(file = %path.display(), "skipping marker: {reason}");
            }
        }
    }
    markers
}

/// Pick the number and text out of one marker span.
pub fn parse_marker(config: &MarkerConfig, span: &str) -> Result<Marker, SkipReason> {
    let mut span = span.replace(['\n', '\r'], "");
    if let Some(prefix) = &config.inline_comment_prefix {
        span = span.replace(prefix.as_str(), "");
    }
    let span = REPEATED_SPACES.replace_all(span.trim(), " ").into_owned();

    let number = config
        .number
        .captures(&span)
        .map(|caps| {
            caps.name("number")
                .map(|m| m.as_str())
                .unwrap_or_else(|| first_group(&caps))
                .to_string()
        })
        .filter(|number| !number.is_empty())
        .ok_or_else(|| SkipReason::NoNumber(span.clone()))?;

    let fragments: Vec<&str> = config
        .text
        .captures_iter(&span)
        .map(|caps| first_group(&caps))
        .collect();
    if fragments.is_empty() {
        return Err(SkipReason::NoText(span));
    }
    let joined = fragments.concat();
    let text = decode_escapes(joined.trim())?;

    Ok(Marker {
        number,
        text: demarkdown(&text),
    })
}

/// The first capture group, or the whole match for a pattern without groups
fn first_group<'h>(caps: &Captures<'h>) -> &'h str {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Resolve the backslash escapes an author may have used inside marker text.
///
/// `\n`, `\t`, `\r`, `\\`, `\"`, `\'`, `\(` and `\)` are decoded. Any other
/// escape is kept as written. A trailing lone backslash is an error.
pub fn decode_escapes(text: &str) -> Result<String, SkipReason> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(escaped @ ('\\' | '"' | '\'' | '(' | ')')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return Err(SkipReason::BadEscape(text.to_string())),
        }
    }
    Ok(out)
}
