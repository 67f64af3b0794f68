//! RFC 2119 keyword detection

use facet::Facet;

/// A normative keyword governing the strength of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Keyword {
    Must,
    MustNot,
    Required,
    Shall,
    ShallNot,
    Should,
    ShouldNot,
    Recommended,
    NotRecommended,
    May,
    Optional,
}

impl Keyword {
    /// Scan order used by [`Keyword::find`]; the first keyword present wins.
    ///
    /// Matching is on the emphasized form, and `**MUST NOT**` does not
    /// contain `**MUST**`, so a negated keyword is never reported as its
    /// positive prefix. A body quoting both `**MUST**` and `**MUST NOT**`
    /// is classified `MUST`.
    pub const PRIORITY: [Keyword; 11] = [
        Keyword::Must,
        Keyword::Required,
        Keyword::Shall,
        Keyword::MustNot,
        Keyword::ShallNot,
        Keyword::Should,
        Keyword::Recommended,
        Keyword::ShouldNot,
        Keyword::NotRecommended,
        Keyword::May,
        Keyword::Optional,
    ];

    /// Parse a keyword from its spelling in the specification
    pub fn parse(s: &str) -> Option<Self> {
        Self::PRIORITY.into_iter().find(|k| k.as_str() == s)
    }

    /// The keyword as it is written in the specification
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Must => "MUST",
            Keyword::MustNot => "MUST NOT",
            Keyword::Required => "REQUIRED",
            Keyword::Shall => "SHALL",
            Keyword::ShallNot => "SHALL NOT",
            Keyword::Should => "SHOULD",
            Keyword::ShouldNot => "SHOULD NOT",
            Keyword::Recommended => "RECOMMENDED",
            Keyword::NotRecommended => "NOT RECOMMENDED",
            Keyword::May => "MAY",
            Keyword::Optional => "OPTIONAL",
        }
    }

    /// The strong-emphasis form this keyword takes in markdown (`**MUST**`)
    pub fn emphasized(&self) -> String {
        format!("**{}**", self.as_str())
    }

    /// Find the keyword governing a block of markdown prose.
    ///
    /// Only emphasized keywords count; a bare "must" in running text is not
    /// normative.
    pub fn find(content: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|k| content.contains(&k.emphasized()))
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_simple_keyword() {
        assert_eq!(
            Keyword::find("> Hook context **MUST** provide the flag key"),
            Some(Keyword::Must)
        );
        assert_eq!(
            Keyword::find("> The provider **MAY** cache"),
            Some(Keyword::May)
        );
    }

    #[test]
    fn test_negated_keyword_wins_over_prefix() {
        assert_eq!(
            Keyword::find("the hook **MUST NOT** modify these properties"),
            Some(Keyword::MustNot)
        );
        assert_eq!(
            Keyword::find("this is **NOT RECOMMENDED**"),
            Some(Keyword::NotRecommended)
        );
        assert_eq!(
            Keyword::find("hooks **SHOULD NOT** throw"),
            Some(Keyword::ShouldNot)
        );
    }

    #[test]
    fn test_priority_applies_when_both_present() {
        let content = "> It **MUST NOT** block, and it **MUST** run.";
        assert_eq!(Keyword::find(content), Some(Keyword::Must));

        let content = "> It **SHOULD** log and **SHALL NOT** panic.";
        assert_eq!(Keyword::find(content), Some(Keyword::ShallNot));

        let content = "> It **MAY** retry; **RECOMMENDED** once.";
        assert_eq!(Keyword::find(content), Some(Keyword::Recommended));
    }

    #[test]
    fn test_unemphasized_keyword_ignored() {
        assert_eq!(Keyword::find("you MUST be joking"), None);
        assert_eq!(Keyword::find(""), None);
    }

    #[test]
    fn test_parse_round_trips_spelling() {
        for keyword in Keyword::PRIORITY {
            assert_eq!(Keyword::parse(keyword.as_str()), Some(keyword));
        }
        assert_eq!(Keyword::parse("must"), None);
        assert_eq!(Keyword::NotRecommended.to_string(), "NOT RECOMMENDED");
    }
}
