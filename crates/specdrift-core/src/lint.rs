//! Checks on generated specification JSON

use crate::spec::{RuleObject, SpecDocument};
use std::path::{Path, PathBuf};

/// A rule that states no normative keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKeyword {
    pub file: PathBuf,
    /// The rule's heading phrase (e.g. "Requirement 1.2")
    pub id: String,
}

/// Everything found while linting a set of JSON files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintFindings {
    /// Number of JSON files looked at
    pub files: usize,
    pub missing_keywords: Vec<MissingKeyword>,
    /// Files that are not shaped like a specification document
    pub malformed: Vec<PathBuf>,
}

impl LintFindings {
    /// Number of errors; malformed files are reported but not counted
    pub fn errors(&self) -> usize {
        self.missing_keywords.len()
    }

    /// Lint one parsed document
    pub fn check_document(&mut self, file: &Path, doc: &SpecDocument) {
        self.files += 1;
        for entry in &doc.rules {
            self.check_rule(file, entry);
            for child in &entry.children {
                self.check_rule(file, child);
            }
        }
    }

    /// Lint the raw contents of one JSON file
    pub fn check_json(&mut self, file: &Path, json: &str) {
        match SpecDocument::from_json(json) {
            Ok(doc) => self.check_document(file, &doc),
            Err(e) => {
                tracing::debug!(file = %file.display(), "not a specification document: {e:#}");
                self.files += 1;
                self.malformed.push(file.to_path_buf());
            }
        }
    }

    fn check_rule(&mut self, file: &Path, rule: &RuleObject) {
        if rule.keyword.is_none() {
            self.missing_keywords.push(MissingKeyword {
                file: file.to_path_buf(),
                id: rule.id.clone(),
            });
        }
    }
}

/// Lint every `.json` file below `dir`, in path order
#[cfg(feature = "walk")]
pub fn lint_dir(dir: impl AsRef<Path>) -> eyre::Result<LintFindings> {
    use eyre::WrapErr;

    let dir = dir.as_ref();
    let files = crate::sources::sorted_files(dir, |path| {
        path.extension().is_some_and(|ext| ext == "json")
    })?;

    let mut findings = LintFindings::default();
    for path in files {
        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        findings.check_json(&path, &content);
    }
    Ok(findings)
}
