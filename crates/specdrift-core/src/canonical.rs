//! Canonical rule map: the authoritative `number -> text` view of a spec

use std::collections::BTreeMap;

use crate::normalize::demarkdown;
use crate::rules::rule_number;
use crate::skip::SkipReason;
use crate::spec::{RuleObject, SpecDocument};

/// Rule text keyed by dotted rule number, as published
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRuleMap {
    pub rules: BTreeMap<String, String>,
}

impl CanonicalRuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a specification document.
    ///
    /// Only entries whose machine id names a requirement are kept, from the
    /// top level and from their direct children. Deeper rules are not part
    /// of the published key space.
    pub fn from_document(doc: &SpecDocument) -> Self {
        let mut map = Self::new();
        for entry in &doc.rules {
            map.insert_requirement(entry);
            for child in &entry.children {
                map.insert_requirement(child);
            }
        }
        map
    }

    fn insert_requirement(&mut self, entry: &RuleObject) {
        if !entry.machine_id.contains("requirement") {
            return;
        }
        match requirement_number(entry) {
            Ok(number) => {
                self.rules
                    .insert(number.to_string(), demarkdown(&entry.content));
            }
            Err(reason) => tracing::warn!("skipping rule: {reason}"),
        }
    }

    /// Text of the rule with the given number
    pub fn get(&self, number: &str) -> Option<&str> {
        self.rules.get(number).map(String::as_str)
    }

    pub fn contains(&self, number: &str) -> bool {
        self.rules.contains_key(number)
    }

    /// Rule numbers in ascending string order
    pub fn numbers(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn requirement_number(entry: &RuleObject) -> Result<&str, SkipReason> {
    rule_number(&entry.id).ok_or_else(|| SkipReason::NoNumber(entry.id.clone()))
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CanonicalRuleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            rules: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleNode;

    fn rule(id: &str, machine_id: &str, content: &str, children: Vec<RuleObject>) -> RuleObject {
        RuleObject {
            id: id.to_string(),
            machine_id: machine_id.to_string(),
            content: content.to_string(),
            keyword: None,
            children,
        }
    }

    #[test]
    fn test_flattens_requirements_and_direct_children() {
        let doc = SpecDocument {
            rules: vec![
                rule(
                    "Requirement 1.1.1",
                    "requirement_1_1_1",
                    "The `API`, and any state it maintains **SHOULD** exist as a global singleton.",
                    vec![],
                ),
                rule(
                    "Condition 2.2.2",
                    "condition_2_2_2",
                    "The implementing language type system differentiates between types.",
                    vec![rule(
                        "Conditional Requirement 2.2.2.1",
                        "conditional_requirement_2_2_2_1",
                        "The `feature provider` interface **MUST** define typed methods.",
                        vec![],
                    )],
                ),
            ],
        };

        let map = CanonicalRuleMap::from_document(&doc);
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("1.1.1"),
            Some("The API, and any state it maintains SHOULD exist as a global singleton.")
        );
        assert_eq!(
            map.get("2.2.2.1"),
            Some("The feature provider interface MUST define typed methods.")
        );
        assert!(!map.contains("2.2.2"));
    }

    #[test]
    fn test_grandchildren_are_not_flattened() {
        let doc = SpecDocument {
            rules: vec![rule(
                "Requirement 1",
                "requirement_1",
                "top",
                vec![rule(
                    "Requirement 1.1",
                    "requirement_1_1",
                    "child",
                    vec![rule("Requirement 1.1.1", "requirement_1_1_1", "grandchild", vec![])],
                )],
            )],
        };
        let map = CanonicalRuleMap::from_document(&doc);
        assert_eq!(map.numbers().collect::<Vec<_>>(), ["1", "1.1"]);
    }

    #[test]
    fn test_entry_without_number_is_skipped() {
        let doc = SpecDocument {
            rules: vec![
                rule("Requirement x", "requirement_x", "no number", vec![]),
                rule("Requirement 3.1", "requirement_3_1", "numbered", vec![]),
            ],
        };
        let map = CanonicalRuleMap::from_document(&doc);
        assert_eq!(map.numbers().collect::<Vec<_>>(), ["3.1"]);
    }

    #[test]
    fn test_from_markdown_rules() {
        let markdown = r#"
# Flag evaluation

### Requirement 1.3.1

> The `client` **MUST** provide methods for typed flag evaluation.

### Condition 1.3.2

> The language supports overloads.

#### Conditional Requirement 1.3.2.1

> The `client` **SHOULD** provide overloads.
"#;
        let rules = RuleNode::parse_markdown(markdown);
        let map = CanonicalRuleMap::from_document(&SpecDocument::from_rules(&rules));
        assert_eq!(
            map.rules,
            BTreeMap::from([
                (
                    "1.3.1".to_string(),
                    "The client MUST provide methods for typed flag evaluation.".to_string()
                ),
                (
                    "1.3.2.1".to_string(),
                    "The client SHOULD provide overloads.".to_string()
                ),
            ])
        );
    }

    #[test]
    fn test_heading_and_marker_agree_on_trailing_dot() {
        use crate::config::MarkerConfig;
        use crate::markers::RepoRuleMap;
        use std::path::Path;

        let doc = SpecDocument {
            rules: vec![rule("Requirement 1.2.3.", "requirement_1_2_3_", "It works.", vec![])],
        };
        let canonical = CanonicalRuleMap::from_document(&doc);
        assert_eq!(canonical.get("1.2.3."), Some("It works."));

        let config = MarkerConfig::inline("rs", "//").unwrap();
        let mut repo = RepoRuleMap::new();
        repo.add_file(&config, Path::new("a.rs"), "// spec:1.2.3.:It works.:end");
        assert_eq!(repo.get("1.2.3."), Some("It works."));
    }
}
