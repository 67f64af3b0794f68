//! Rule extraction: content tree to rule forest
//!
//! A heading is a rule when its text names a `requirement` or a `condition`:
//!
//! ```markdown
//! #### Requirement 1.1.2
//!
//! > The `API` **MUST** provide a function to set the global provider.
//! ```
//!
//! Every other heading ("Overview", "Definitions", ...) only groups rules.
//! Grouping headings are dropped and the rules found under them move up to
//! take their place.
//!
//! ```
//! use specdrift_core::rules::RuleNode;
//!
//! let markdown = r#"
//! # Providers
//!
//! ## Requirement 2.1
//!
//! > The provider **MUST** have a name.
//! "#;
//!
//! let rules = RuleNode::parse_markdown(markdown);
//! assert_eq!(rules.len(), 1);
//! assert_eq!(rules[0].id, "Requirement 2.1");
//! assert_eq!(rules[0].number(), Some("2.1"));
//! assert_eq!(rules[0].content, "The provider MUST have a name.");
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::hierarchy::{ContentNode, ContentTree};
use crate::keyword::Keyword;
use crate::normalize::clean_content;
use crate::spec::RuleObject;

static RULE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:requirement|condition)[^\n]+").expect("rule heading regex")
});

// Same character class as the default marker number pattern, so a heading
// and a marker quoting it key the same entry.
static RULE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d.]+").expect("rule number regex"));

/// A rule extracted from a specification document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    /// Heading phrase identifying the rule (e.g. "Requirement 4.3.6")
    pub id: String,
    /// Identifier-safe slug of `id` (e.g. "requirement_4_3_6")
    pub machine_id: String,
    /// Normalized rule text
    pub content: String,
    pub keyword: Option<Keyword>,
    /// Rules nested under this one, in document order
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    /// Build a rule from a single heading, if the heading names one.
    ///
    /// Children are not looked at; see [`RuleNode::from_tree`].
    pub fn from_heading(headline: &str, body: &str) -> Option<Self> {
        let id = RULE_HEADING.find(headline)?.as_str().trim_end().to_string();
        Some(Self {
            machine_id: machine_id(&id),
            content: clean_content(body),
            keyword: Keyword::find(body),
            id,
            children: Vec::new(),
        })
    }

    /// Extract the rule forest of a content tree.
    pub fn from_tree(tree: &ContentTree) -> Vec<RuleNode> {
        match resolve(&tree.root) {
            Resolved::Rule(rule) => vec![rule],
            Resolved::Hoisted(rules) => rules,
            Resolved::Empty => Vec::new(),
        }
    }

    /// Extract the rule forest of a markdown document.
    pub fn parse_markdown(markdown: &str) -> Vec<RuleNode> {
        Self::from_tree(&ContentTree::parse(markdown))
    }

    /// The dotted-numeric part of the id, the key rules are compared by
    pub fn number(&self) -> Option<&str> {
        rule_number(&self.id)
    }

    /// This rule followed by all of its descendants, depth first
    pub fn walk(&self) -> Vec<&RuleNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// Outcome of resolving one content node against the rule grammar
#[derive(Debug)]
enum Resolved {
    /// The node is a rule; its rule descendants are already attached
    Rule(RuleNode),
    /// The node only groups rules, which replace it in its parent
    Hoisted(Vec<RuleNode>),
    /// Neither the node nor anything below it is a rule
    Empty,
}

fn resolve(node: &ContentNode) -> Resolved {
    let mut children = Vec::new();
    for child in &node.children {
        match resolve(child) {
            Resolved::Rule(rule) => children.push(rule),
            Resolved::Hoisted(rules) => children.extend(rules),
            Resolved::Empty => {}
        }
    }

    match RuleNode::from_heading(&node.headline, &node.body) {
        Some(mut rule) => {
            rule.children = children;
            Resolved::Rule(rule)
        }
        None if children.is_empty() => Resolved::Empty,
        None => Resolved::Hoisted(children),
    }
}

/// Lowercase a rule id and replace every non-word character with `_`.
pub fn machine_id(id: &str) -> String {
    id.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// First run of digits and dots in a rule id ("Requirement 1.2.3" gives
/// "1.2.3"). Dots are kept as written, trailing ones included.
pub fn rule_number(id: &str) -> Option<&str> {
    RULE_NUMBER.find(id).map(|m| m.as_str())
}

/// Order two rule ids by their dotted numbers, component by component.
///
/// `1.10` sorts after `1.9`. Ids without a number sort after all numbered ones.
pub fn compare_rule_ids(a: &str, b: &str) -> Ordering {
    fn components(id: &str) -> Option<Vec<u64>> {
        rule_number(id).map(|number| {
            number
                .split('.')
                .filter(|part| !part.is_empty())
                .map(|part| part.parse().unwrap_or(u64::MAX))
                .collect()
        })
    }

    match (components(a), components(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Two rules claiming the same machine id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRule {
    pub machine_id: String,
    /// Document where the machine id was first seen
    pub first: PathBuf,
    /// Document that claimed it again
    pub second: PathBuf,
}

/// Rules gathered from every document of a specification corpus
#[derive(Debug, Default)]
pub struct RuleCorpus {
    /// Per-document rule forests, in the order they were added
    pub documents: Vec<(PathBuf, Vec<RuleNode>)>,
    seen: HashMap<String, PathBuf>,
}

impl RuleCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the rules of one document.
    ///
    /// Returns every machine id (at any depth) that an earlier rule already
    /// claimed, including earlier rules of the same document.
    pub fn add(&mut self, path: impl Into<PathBuf>, rules: Vec<RuleNode>) -> Vec<DuplicateRule> {
        let path = path.into();
        let mut duplicates = Vec::new();
        for rule in rules.iter().flat_map(RuleNode::walk) {
            if let Some(first) = self.seen.get(&rule.machine_id) {
                duplicates.push(DuplicateRule {
                    machine_id: rule.machine_id.clone(),
                    first: first.clone(),
                    second: path.clone(),
                });
            } else {
                self.seen.insert(rule.machine_id.clone(), path.clone());
            }
        }
        self.documents.push((path, rules));
        duplicates
    }

    /// All top-level rules of the corpus, sorted by dotted number
    pub fn combined(&self) -> Vec<RuleObject> {
        let mut rules: Vec<RuleObject> = self
            .documents
            .iter()
            .flat_map(|(_, rules)| rules.iter().map(RuleObject::from))
            .collect();
        rules.sort_by(|a, b| compare_rule_ids(&a.id, &b.id));
        rules
    }

    /// The rules of one document, by path
    pub fn document(&self, path: &Path) -> Option<&[RuleNode]> {
        self.documents
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn len(&self) -> usize {
        self.documents.iter().map(|(_, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
