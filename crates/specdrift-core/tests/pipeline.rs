//! Integration tests for the markdown -> JSON -> reconciliation pipeline
#![cfg(feature = "walk")]

use std::path::{Path, PathBuf};

use specdrift_core::{
    CanonicalRuleMap, MarkdownFiles, MarkerConfig, Report, RuleCorpus, RuleNode, SpecDocument,
    Sources, WalkSources,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

#[test]
fn test_markdown_generates_published_json() {
    let markdown = read_fixture("spec/specification/sections/04-hooks.md");
    let rules = RuleNode::parse_markdown(&markdown);

    let generated = SpecDocument::from_rules(&rules);
    let published = SpecDocument::load(fixture_path("specification.json")).unwrap();
    assert_eq!(generated, published);
}

#[test]
fn test_rules_nest_and_hoist() {
    let markdown = read_fixture("spec/specification/sections/04-hooks.md");
    let rules = RuleNode::parse_markdown(&markdown);

    let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "Requirement 4.1.1",
            "Requirement 4.1.2",
            "Requirement 4.3.6",
            "Condition 4.3.8"
        ]
    );
    assert_eq!(rules[3].children.len(), 1);
    assert_eq!(rules[3].children[0].number(), Some("4.3.8.1"));
    assert!(rules[3].keyword.is_none());
}

#[test]
fn test_markdown_discovery_skips_ignored_readme() {
    let files = MarkdownFiles::new(fixture_path("spec")).discover().unwrap();
    assert_eq!(files, [fixture_path("spec/specification/sections/04-hooks.md")]);

    let mut corpus = RuleCorpus::new();
    for file in &files {
        let markdown = std::fs::read_to_string(file).unwrap();
        let duplicates = corpus.add(file, RuleNode::parse_markdown(&markdown));
        assert!(duplicates.is_empty());
    }
    assert_eq!(corpus.len(), 4);
}

#[test]
fn test_canonical_map_from_published_json() {
    let doc = SpecDocument::load(fixture_path("specification.json")).unwrap();
    let canonical = CanonicalRuleMap::from_document(&doc);

    assert_eq!(
        canonical.numbers().collect::<Vec<_>>(),
        ["4.1.1", "4.1.2", "4.3.6", "4.3.8.1"]
    );
    assert_eq!(
        canonical.get("4.1.1"),
        Some(
            "Hook context MUST provide: the flag key, flag value type, evaluation context, and the default value."
        )
    );
}

#[test]
fn test_check_fixture_implementation() {
    let code_dir = fixture_path("impl");
    let config = MarkerConfig::load_from_dir(&code_dir).unwrap();
    let repo = WalkSources::new(&code_dir).extract(&config).unwrap();
    assert_eq!(repo.len(), 4);
    assert!(repo.duplicates.is_empty());

    let doc = SpecDocument::load(fixture_path("specification.json")).unwrap();
    let canonical = CanonicalRuleMap::from_document(&doc);

    let report = Report::compute(&canonical, &repo, &[]);
    assert_eq!(report.good, ["4.1.1", "4.3.6"]);
    assert_eq!(report.different_text, ["4.1.2"]);
    assert_eq!(report.missing, ["4.3.8.1"]);
    assert_eq!(report.extra, ["4.9.9"]);
    assert_eq!(report.defects(), 3);
}

#[test]
fn test_check_fixture_with_id_filter() {
    let code_dir = fixture_path("impl");
    let config = MarkerConfig::load_from_dir(&code_dir).unwrap();
    let repo = WalkSources::new(&code_dir).extract(&config).unwrap();
    let canonical =
        CanonicalRuleMap::from_document(&SpecDocument::load(fixture_path("specification.json")).unwrap());

    let only = vec!["4.1.1".to_string(), "4.3.6".to_string()];
    let report = Report::compute(&canonical, &repo, &only);
    assert_eq!(report.good, ["4.1.1", "4.3.6"]);
    assert!(report.is_clean());
}
