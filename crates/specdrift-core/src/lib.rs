//! specdrift-core - Core library for specification conformance drift
//!
//! This crate provides the building blocks for:
//! - Extracting normative rules from markdown specification documents
//! - Loading the published specification snapshot (JSON)
//! - Extracting the rules an implementation quotes in its source comments
//! - Reconciling the two into a report of matching, drifted, missing and
//!   extra rules
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] and [`MarkdownFiles`] for gitignore-aware
//!   directory walking (brings in `ignore` and `globset`)
//! - `fetch` - Enable [`SpecDocument::load_or_fetch`] for downloading the
//!   specification snapshot (brings in `ureq`)
//!
//! # Extracting Rules from Markdown
//!
//! A heading naming a requirement or a condition starts a rule; its
//! blockquote is the rule text:
//!
//! ```
//! use specdrift_core::{RuleNode, SpecDocument};
//!
//! let markdown = r#"
//! ## Evaluation
//!
//! ### Requirement 1.3.1
//!
//! > The `client` **MUST** provide methods for typed flag evaluation.
//! "#;
//!
//! let rules = RuleNode::parse_markdown(markdown);
//! assert_eq!(rules[0].machine_id, "requirement_1_3_1");
//! assert_eq!(rules[0].keyword.map(|k| k.as_str()), Some("MUST"));
//!
//! let json = SpecDocument::from_rules(&rules).to_json();
//! assert!(json.contains("RFC 2119 keyword"));
//! ```
//!
//! # Checking an Implementation
//!
//! ```
//! use specdrift_core::{CanonicalRuleMap, MarkerConfig, MemorySources, Report, Sources};
//!
//! let canonical: CanonicalRuleMap = [
//!     ("1.1.1", "The API SHOULD exist as a global singleton."),
//!     ("1.1.2", "The API MUST provide a function to set the provider."),
//! ]
//! .into_iter()
//! .collect();
//!
//! let config = MarkerConfig::inline("rs", "//").unwrap();
//! let repo = MemorySources::new()
//!     .add("api.rs", "// spec:1.1.1:The API **SHOULD** exist as a global singleton.:end")
//!     .extract(&config)
//!     .unwrap();
//!
//! let report = Report::compute(&canonical, &repo, &[]);
//! assert_eq!(report.good, ["1.1.1"]);
//! assert_eq!(report.missing, ["1.1.2"]);
//! assert_eq!(report.defects(), 1);
//! ```

pub mod canonical;
pub mod config;
pub mod hierarchy;
pub mod keyword;
pub mod lint;
pub mod markers;
pub mod normalize;
pub mod reconcile;
pub mod rules;
mod skip;
mod sources;
pub mod spec;

pub use canonical::CanonicalRuleMap;
pub use config::MarkerConfig;
pub use keyword::Keyword;
pub use lint::LintFindings;
pub use markers::{DuplicateMarker, Marker, RepoRuleMap};
pub use reconcile::Report;
pub use rules::{DuplicateRule, RuleCorpus, RuleNode};
pub use skip::SkipReason;
pub use sources::{IGNORE_FILE_NAME, MemorySources, PathSources, Sources};
pub use spec::{DEFAULT_SPEC_URL, RuleObject, SPEC_FILE_NAME, SpecDocument};

#[cfg(feature = "walk")]
pub use lint::lint_dir;
#[cfg(feature = "walk")]
pub use sources::{MarkdownFiles, WalkSources};
