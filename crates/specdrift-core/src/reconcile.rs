//! Reconciliation of a canonical rule map against an implementation

use crate::canonical::CanonicalRuleMap;
use crate::markers::RepoRuleMap;
use eyre::{Result, WrapErr};
use facet::Facet;
use std::collections::BTreeSet;
use std::path::Path;

/// Name of the JSON report written for a given source extension
pub fn report_file_name(file_extension: &str) -> String {
    format!("{file_extension}-report.json")
}

/// Outcome of comparing the rules an implementation quotes with the
/// published ones. Every list is sorted and no id appears in two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Report {
    /// Quoted with exactly the published text
    pub good: Vec<String>,

    /// Quoted, but with text that differs from the published text
    #[facet(rename = "different-text")]
    pub different_text: Vec<String>,

    /// Published, but quoted nowhere
    pub missing: Vec<String>,

    /// Quoted, but not published
    pub extra: Vec<String>,
}

impl Report {
    /// Compare both maps.
    ///
    /// A non-empty `only` restricts both sides to those rule numbers first.
    pub fn compute(canonical: &CanonicalRuleMap, repo: &RepoRuleMap, only: &[String]) -> Self {
        let selected = |number: &str| only.is_empty() || only.iter().any(|o| o == number);

        let mut missing: BTreeSet<&str> = canonical.numbers().filter(|&n| selected(n)).collect();
        let mut good = BTreeSet::new();
        let mut different_text = BTreeSet::new();
        let mut extra = BTreeSet::new();

        for (number, text) in repo.rules.iter().filter(|(n, _)| selected(n.as_str())) {
            missing.remove(number.as_str());
            match canonical.get(number) {
                None => {
                    extra.insert(number.as_str());
                }
                Some(published) if published == text => {
                    good.insert(number.as_str());
                }
                Some(_) => {
                    different_text.insert(number.as_str());
                }
            }
        }

        let owned = |set: BTreeSet<&str>| -> Vec<String> {
            set.into_iter().map(str::to_string).collect()
        };
        Report {
            good: owned(good),
            different_text: owned(different_text),
            missing: owned(missing),
            extra: owned(extra),
        }
    }

    /// Number of rules that are not `good`
    pub fn defects(&self) -> usize {
        self.different_text.len() + self.missing.len() + self.extra.len()
    }

    /// Whether the implementation quotes every rule verbatim and nothing else
    pub fn is_clean(&self) -> bool {
        self.defects() == 0
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> String {
        facet_json::to_string(self)
    }

    /// Write the report as JSON
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json())
            .wrap_err_with(|| format!("Failed to write report to {}", path.display()))
    }
}
