//! Heading hierarchy: flat markdown sections to a nested content tree
//!
//! A specification document is a run of headings, each followed by some body
//! text. [`sections`] cuts a document into `(level, headline, body)` triples
//! and [`ContentTree::build`] nests them the way the headings nest.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::skip::SkipReason;

/// Deepest heading level markdown supports
const MAX_LEVEL: usize = 6;

/// A heading and the raw markdown between it and the next heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading depth (1 for `#`, 2 for `##`, ...)
    pub level: usize,
    /// Heading text
    pub headline: String,
    /// Raw markdown up to the next heading of any level
    pub body: String,
}

impl Section {
    pub fn new(level: usize, headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            headline: headline.into(),
            body: body.into(),
        }
    }
}

/// Split a markdown document into sections, one per heading.
///
/// Text before the first heading belongs to no section and is dropped.
/// Headings inside code blocks are not headings.
pub fn sections(markdown: &str) -> Vec<Section> {
    // (level, headline, start of heading, end of heading)
    let mut headings: Vec<(usize, String, usize, usize)> = Vec::new();
    let mut current: Option<(usize, String, usize)> = None;

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((level as usize, String::new(), range.start));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, headline, _)) = current.as_mut() {
                    headline.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, headline, start)) = current.take() {
                    headings.push((level, headline.trim().to_string(), start, range.end));
                }
            }
            _ => {}
        }
    }

    let mut result = Vec::with_capacity(headings.len());
    for (idx, (level, headline, _, end)) in headings.iter().enumerate() {
        let body_end = headings
            .get(idx + 1)
            .map(|(_, _, next_start, _)| *next_start)
            .unwrap_or(markdown.len());
        let body = markdown.get(*end..body_end).unwrap_or_default();
        result.push(Section::new(*level, headline.clone(), body));
    }
    result
}

/// A node of the content tree: a heading with everything nested under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub level: usize,
    pub headline: String,
    pub body: String,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    fn from_section(section: Section) -> Self {
        Self {
            level: section.level,
            headline: section.headline,
            body: section.body,
            children: Vec::new(),
        }
    }
}

/// Nested headings of a document, under a synthetic root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTree {
    /// Level 0, empty headline and body; never a rule
    pub root: ContentNode,
}

impl ContentTree {
    /// Nest a flat run of sections by heading level.
    ///
    /// Open headings are kept on a stack. A strictly deeper heading opens a
    /// child of the heading on top; anything else closes headings until the
    /// top is shallower than the incoming one. Malformed sections are logged
    /// and skipped.
    pub fn build(sections: impl IntoIterator<Item = Section>) -> Self {
        let mut roots: Vec<ContentNode> = Vec::new();
        let mut stack: Vec<ContentNode> = Vec::new();

        for section in sections {
            if let Err(reason) = check_section(&section) {
                tracing::warn!(headline = %section.headline, "skipping heading: {reason}");
                continue;
            }

            while stack.last().is_some_and(|top| top.level >= section.level) {
                close_top(&mut stack, &mut roots);
            }
            stack.push(ContentNode::from_section(section));
        }

        while !stack.is_empty() {
            close_top(&mut stack, &mut roots);
        }

        ContentTree {
            root: ContentNode {
                level: 0,
                headline: String::new(),
                body: String::new(),
                children: roots,
            },
        }
    }

    /// Parse a markdown document straight into its content tree
    pub fn parse(markdown: &str) -> Self {
        Self::build(sections(markdown))
    }

    /// Top-level headings of the document
    pub fn nodes(&self) -> &[ContentNode] {
        &self.root.children
    }
}

fn check_section(section: &Section) -> Result<(), SkipReason> {
    if section.headline.trim().is_empty() {
        return Err(SkipReason::EmptyHeadline);
    }
    if section.level == 0 || section.level > MAX_LEVEL {
        return Err(SkipReason::HeadingTooDeep(section.level));
    }
    Ok(())
}

/// Pop the innermost open heading and attach it to its parent.
fn close_top(stack: &mut Vec<ContentNode>, roots: &mut Vec<ContentNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headlines(nodes: &[ContentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.headline.as_str()).collect()
    }

    #[test]
    fn test_sections_split_on_headings() {
        let markdown = "preamble\n# Hooks\n\n## Requirement 1.1\n\n> Hook context **MUST** exist.\n";
        let sections = sections(markdown);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level, 1);
        assert_eq!(sections[0].headline, "Hooks");
        assert_eq!(sections[0].body.trim(), "");
        assert_eq!(sections[1].level, 2);
        assert_eq!(sections[1].headline, "Requirement 1.1");
        assert_eq!(sections[1].body.trim(), "> Hook context **MUST** exist.");
    }

    #[test]
    fn test_sections_ignore_code_blocks() {
        let markdown = "# Title\n\n```sh\n# not a heading\n```\n\n## Next\n";
        let sections = sections(markdown);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].body.contains("# not a heading"));
        assert_eq!(sections[1].headline, "Next");
    }

    #[test]
    fn test_build_siblings() {
        let tree = ContentTree::build([Section::new(1, "a", ""), Section::new(1, "b", "")]);
        assert_eq!(headlines(tree.nodes()), ["a", "b"]);
        assert!(tree.nodes().iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_build_child() {
        let tree = ContentTree::build([Section::new(1, "a", ""), Section::new(2, "b", "")]);
        assert_eq!(headlines(tree.nodes()), ["a"]);
        assert_eq!(headlines(&tree.nodes()[0].children), ["b"]);
    }

    #[test]
    fn test_build_shallower_heading_closes_deeper_run() {
        let tree = ContentTree::build([
            Section::new(1, "top", ""),
            Section::new(2, "section", ""),
            Section::new(3, "deep one", ""),
            Section::new(3, "deep two", ""),
            Section::new(2, "next section", ""),
            Section::new(1, "second top", ""),
        ]);
        assert_eq!(headlines(tree.nodes()), ["top", "second top"]);
        let top = &tree.nodes()[0];
        assert_eq!(headlines(&top.children), ["section", "next section"]);
        assert_eq!(
            headlines(&top.children[0].children),
            ["deep one", "deep two"]
        );
    }

    #[test]
    fn test_build_jumps_several_levels() {
        let tree = ContentTree::build([
            Section::new(2, "a", ""),
            Section::new(6, "deep", ""),
            Section::new(5, "less deep", ""),
            Section::new(2, "b", ""),
        ]);
        assert_eq!(headlines(tree.nodes()), ["a", "b"]);
        assert_eq!(headlines(&tree.nodes()[0].children), ["deep", "less deep"]);
    }

    #[test]
    fn test_build_deeper_first_heading_then_shallower() {
        let tree = ContentTree::build([Section::new(2, "a", ""), Section::new(1, "b", "")]);
        assert_eq!(headlines(tree.nodes()), ["a", "b"]);
    }

    #[test]
    fn test_build_skips_malformed_sections() {
        let tree = ContentTree::build([
            Section::new(1, "a", ""),
            Section::new(7, "too deep", ""),
            Section::new(2, "  ", ""),
            Section::new(2, "b", ""),
        ]);
        assert_eq!(headlines(tree.nodes()), ["a"]);
        assert_eq!(headlines(&tree.nodes()[0].children), ["b"]);
    }

    #[test]
    fn test_root_is_synthetic() {
        let tree = ContentTree::parse("# a\n");
        assert_eq!(tree.root.level, 0);
        assert!(tree.root.headline.is_empty());
        assert_eq!(tree.nodes().len(), 1);
    }
}
