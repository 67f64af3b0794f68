//! Marker extraction configuration (`.specrc`)
//!
//! The config lives at `.specrc` in the code directory and is an ini
//! document with a single `[spec]` section:
//!
//! ```ini
//! [spec]
//! file_extension = rs
//! inline_comment_prefix = //
//! ```
//!
//! Setting only `inline_comment_prefix` selects the default marker syntax,
//! `spec:<number>:<text>:end`. Projects that embed rules differently supply
//! their own patterns instead:
//!
//! ```ini
//! [spec]
//! file_extension = java
//! multiline_regex = @Specification\((.*?)\)\s*\n
//! number_subregex = number\s*=\s*"(?P<number>[\d.]+)"
//! text_subregex = text\s*=\s*"(.*)"
//! ```

use eyre::{Result, WrapErr, bail};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::path::Path;

/// File name of the config, relative to the code directory
pub const CONFIG_FILE_NAME: &str = ".specrc";

/// Marker span used when only a comment prefix is configured
pub const DEFAULT_MULTILINE_REGEX: &str = r"spec:(.*?):end";
/// Rule number inside a default marker span
pub const DEFAULT_NUMBER_SUBREGEX: &str = r"(?P<number>[\d.]+):";
/// Rule text inside a default marker span
pub const DEFAULT_TEXT_SUBREGEX: &str = r"[\d.]+:(.*)";

const SECTION: &str = "spec";
const PATTERN_KEYS: [&str; 3] = ["multiline_regex", "number_subregex", "text_subregex"];

/// Validated marker extraction settings
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    /// Extension of the source files to scan, without the dot (e.g. "rs")
    pub file_extension: String,
    /// Bounds one marker; may span several lines
    pub multiline: Regex,
    /// Finds the rule number inside a marker span
    pub number: Regex,
    /// Finds the rule text inside a marker span
    pub text: Regex,
    /// Comment leader stripped from continuation lines (e.g. "//")
    pub inline_comment_prefix: Option<String>,
}

impl MarkerConfig {
    /// Default `spec:<number>:<text>:end` markers behind a comment prefix
    pub fn inline(file_extension: impl Into<String>, prefix: impl Into<String>) -> Result<Self> {
        Self::custom(
            file_extension,
            DEFAULT_MULTILINE_REGEX,
            DEFAULT_NUMBER_SUBREGEX,
            DEFAULT_TEXT_SUBREGEX,
            Some(prefix.into()),
        )
    }

    /// Markers described by explicit patterns
    pub fn custom(
        file_extension: impl Into<String>,
        multiline_regex: &str,
        number_subregex: &str,
        text_subregex: &str,
        inline_comment_prefix: Option<String>,
    ) -> Result<Self> {
        let file_extension = file_extension.into();
        let file_extension = file_extension.trim_start_matches('.').to_string();
        if file_extension.is_empty() {
            bail!("file_extension must not be empty");
        }

        Ok(Self {
            file_extension,
            multiline: compile("multiline_regex", multiline_regex, true)?,
            number: compile("number_subregex", number_subregex, false)?,
            text: compile("text_subregex", text_subregex, true)?,
            inline_comment_prefix: inline_comment_prefix.filter(|p| !p.is_empty()),
        })
    }

    /// Parse and validate the contents of a `.specrc` file
    pub fn from_ini(content: &str) -> Result<Self> {
        let sections = parse_ini(content)?;
        let Some(spec) = sections.get(SECTION) else {
            bail!("missing [{SECTION}] section");
        };

        let Some(file_extension) = spec.get("file_extension") else {
            bail!("[{SECTION}] is missing file_extension");
        };
        let prefix = spec.get("inline_comment_prefix").cloned();

        let patterns: Vec<Option<&String>> = PATTERN_KEYS.iter().map(|k| spec.get(*k)).collect();
        match (patterns.as_slice(), prefix) {
            ([Some(multiline), Some(number), Some(text)], prefix) => {
                Self::custom(file_extension.as_str(), multiline, number, text, prefix)
            }
            ([None, None, None], Some(prefix)) => Self::inline(file_extension.as_str(), prefix),
            ([None, None, None], None) => bail!(
                "[{SECTION}] needs either inline_comment_prefix or all of {}",
                PATTERN_KEYS.join(", ")
            ),
            _ => {
                let missing: Vec<&str> = PATTERN_KEYS
                    .iter()
                    .zip(&patterns)
                    .filter(|(_, value)| value.is_none())
                    .map(|(key, _)| *key)
                    .collect();
                bail!("[{SECTION}] is missing {}", missing.join(", "))
            }
        }
    }

    /// Load the config from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!(
                "Config file not found at {}\n\n\
                 Create one describing how rules are marked in your code:\n\n\
                 [spec]\n\
                 file_extension = rs\n\
                 inline_comment_prefix = //",
                path.display()
            );
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_ini(&content)
            .wrap_err_with(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load `.specrc` from a code directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    /// Whether a file name carries the configured extension
    pub fn matches_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.to_string_lossy() == self.file_extension)
    }
}

fn compile(key: &str, pattern: &str, dot_all: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .dot_matches_new_line(dot_all)
        .build()
        .wrap_err_with(|| format!("{key} is not a valid regular expression: {pattern}"))
}

/// Minimal ini reader: `[section]` headers, `key = value` or `key: value`
/// pairs, indented continuation lines, `#`/`;` comment lines.
///
/// Values are taken verbatim (no quote or escape processing) since they are
/// mostly regular expressions. Keys are lowercased.
fn parse_ini(content: &str) -> Result<HashMap<String, HashMap<String, String>>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut section: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            last_key = None;
            continue;
        }
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            if let (Some(section), Some(key)) = (&section, &last_key) {
                if let Some(value) = sections
                    .get_mut(section)
                    .and_then(|entries| entries.get_mut(key))
                {
                    value.push('\n');
                    value.push_str(line);
                    continue;
                }
            }
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            section = Some(name);
            last_key = None;
            continue;
        }

        let Some(split) = line.find(['=', ':']) else {
            bail!("line {line_num}: expected `key = value`, found `{line}`");
        };
        let Some(current) = &section else {
            bail!("line {line_num}: `{line}` appears before any [section]");
        };

        let key = line[..split].trim().to_lowercase();
        let value = line[split + 1..].trim().to_string();
        sections
            .entry(current.clone())
            .or_default()
            .insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_selects_default_patterns() {
        let config = MarkerConfig::from_ini("[spec]\nfile_extension = rs\ninline_comment_prefix = //\n")
            .unwrap();
        assert_eq!(config.file_extension, "rs");
        assert_eq!(config.inline_comment_prefix.as_deref(), Some("//"));
        assert_eq!(config.multiline.as_str(), DEFAULT_MULTILINE_REGEX);
        assert_eq!(config.number.as_str(), DEFAULT_NUMBER_SUBREGEX);
        assert_eq!(config.text.as_str(), DEFAULT_TEXT_SUBREGEX);
    }

    #[test]
    fn test_custom_patterns_keep_backslashes() {
        let ini = r#"
[spec]
file_extension = java
multiline_regex = @Specification\((.*?)\)\s*\n
number_subregex = number\s*=\s*"(?P<number>[\d.]+)"
text_subregex = text\s*=\s*"(.*)"
"#;
        let config = MarkerConfig::from_ini(ini).unwrap();
        assert_eq!(config.multiline.as_str(), r"@Specification\((.*?)\)\s*\n");
        assert_eq!(config.number.as_str(), r#"number\s*=\s*"(?P<number>[\d.]+)""#);
        assert!(config.inline_comment_prefix.is_none());
    }

    #[test]
    fn test_colon_delimiter_and_key_case() {
        let config = MarkerConfig::from_ini("[spec]\nFile_Extension: .py\ninline_comment_prefix: #\n")
            .unwrap();
        assert_eq!(config.file_extension, "py");
        assert_eq!(config.inline_comment_prefix.as_deref(), Some("#"));
    }

    #[test]
    fn test_first_delimiter_splits() {
        let config = MarkerConfig::from_ini(
            "[spec]\nfile_extension = go\nmultiline_regex = spec:(.*?):end\nnumber_subregex = (?P<number>[\\d.]+):\ntext_subregex = [\\d.]+:(.*)\ninline_comment_prefix = //\n",
        )
        .unwrap();
        assert_eq!(config.multiline.as_str(), "spec:(.*?):end");
    }

    #[test]
    fn test_missing_section() {
        let err = MarkerConfig::from_ini("[other]\nfile_extension = rs\n").unwrap_err();
        assert!(err.to_string().contains("missing [spec] section"));
    }

    #[test]
    fn test_missing_file_extension() {
        let err = MarkerConfig::from_ini("[spec]\ninline_comment_prefix = //\n").unwrap_err();
        assert!(err.to_string().contains("file_extension"));
    }

    #[test]
    fn test_missing_patterns_and_prefix() {
        let err = MarkerConfig::from_ini("[spec]\nfile_extension = rs\n").unwrap_err();
        assert!(err.to_string().contains("inline_comment_prefix"));
    }

    #[test]
    fn test_partial_patterns() {
        let err = MarkerConfig::from_ini(
            "[spec]\nfile_extension = rs\nmultiline_regex = spec:(.*?):end\n",
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("number_subregex"), "{msg}");
        assert!(msg.contains("text_subregex"), "{msg}");
        assert!(!msg.contains("multiline_regex"), "{msg}");
    }

    #[test]
    fn test_invalid_regex() {
        let err = MarkerConfig::custom("rs", "spec:(", "x", "y", None).unwrap_err();
        assert!(err.to_string().contains("multiline_regex"));
    }

    #[test]
    fn test_continuation_lines() {
        let sections = parse_ini("[spec]\nkey = first\n  second\n").unwrap();
        assert_eq!(sections["spec"]["key"], "first\nsecond");
    }

    #[test]
    fn test_line_without_delimiter() {
        let err = parse_ini("[spec]\njust words\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkerConfig::load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_matches_file() {
        let config = MarkerConfig::inline("rs", "//").unwrap();
        assert!(config.matches_file(Path::new("src/lib.rs")));
        assert!(!config.matches_file(Path::new("src/lib.rsx")));
        assert!(!config.matches_file(Path::new("Makefile")));
    }
}
