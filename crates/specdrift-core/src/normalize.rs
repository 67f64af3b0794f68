//! Text normalization shared by the markdown and source-marker paths
//!
//! Rule text is compared byte for byte during reconciliation, so both sides
//! must be cleaned up the same way:
//!
//! - [`clean_content`] turns the raw markdown body under a rule heading into
//!   plain prose.
//! - [`demarkdown`] strips the leftover markup from text that has already
//!   been extracted (canonical JSON content, inline marker text).

use crate::keyword::Keyword;

/// Transmute a markdown rule body into plain text.
///
/// Only blockquote lines carry rule text. Their `>` markers (nested ones
/// included) are removed and
/// the lines are joined with single spaces so that line-wrapped sentences
/// read as continuous prose. Emphasis around normative keywords is dropped
/// (`**MUST**` becomes `MUST`).
///
/// A body with no blockquote line at all is taken as plain prose, which
/// makes the function idempotent on its own output.
pub fn clean_content(content: &str) -> String {
    let quoted: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('>'))
        .map(|line| line.trim_start_matches(|c: char| c == '>' || c.is_whitespace()))
        .filter(|line| !line.is_empty())
        .collect();

    let lines: Vec<&str> = if quoted.is_empty() {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    } else {
        quoted
    };

    let mut text = lines.join(" ");
    for keyword in Keyword::PRIORITY {
        text = text.replace(&keyword.emphasized(), keyword.as_str());
    }
    text.trim().to_string()
}

/// Strip bold markers, backticks and double quotes from extracted rule text.
pub fn demarkdown(text: &str) -> String {
    text.replace("**", "").replace(['`', '"'], "")
}
