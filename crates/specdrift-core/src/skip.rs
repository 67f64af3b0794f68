//! Reasons a single unit of input is skipped
//!
//! Malformed headings and markers never abort a batch: the loop that
//! encounters one logs the reason and moves on to the next unit.

/// Why a heading, JSON rule entry or source marker was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A heading with no text
    EmptyHeadline,
    /// A heading nested deeper than markdown allows
    HeadingTooDeep(usize),
    /// A rule id with no dotted-numeric part
    NoNumber(String),
    /// A marker span with no text after its number
    NoText(String),
    /// A marker whose text ends in the middle of an escape sequence
    BadEscape(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyHeadline => f.write_str("heading has no text"),
            SkipReason::HeadingTooDeep(level) => {
                write!(f, "heading level {level} is deeper than 6")
            }
            SkipReason::NoNumber(id) => write!(f, "no dotted number in '{id}'"),
            SkipReason::NoText(span) => write!(f, "no rule text in '{span}'"),
            SkipReason::BadEscape(text) => {
                write!(f, "unterminated escape sequence in '{text}'")
            }
        }
    }
}
