//! Output formatting for reconciliation reports and lint findings

use owo_colors::OwoColorize;
use specdrift_core::{CanonicalRuleMap, LintFindings, RepoRuleMap, Report};

/// Render a reconciliation report as text.
///
/// With `diff` set, every drifted rule is followed by the published text and
/// the text the implementation quotes.
pub fn render_report(
    report: &Report,
    canonical: &CanonicalRuleMap,
    repo: &RepoRuleMap,
    diff: bool,
) -> String {
    let mut output = String::new();

    for number in &report.different_text {
        output.push_str(&format!("{} {} is bad.\n", "!".red().bold(), number));
        if diff {
            output.push_str(&format!("{}\n", "Official:".green()));
            output.push_str(&format!("\t{}\n", canonical.get(number).unwrap_or_default()));
            output.push('\n');
            output.push_str(&format!("{}\n", "Ours:".yellow()));
            output.push_str(&format!("\t{}\n", repo.get(number).unwrap_or_default()));
        }
    }

    for number in &report.extra {
        output.push_str(&format!(
            "{} {} is defined in our tests, but couldn't find it in the spec\n",
            "?".yellow().bold(),
            number
        ));
    }

    if !report.missing.is_empty() {
        output.push_str("In the spec, but not in our tests:\n");
        for number in &report.missing {
            output.push_str(&format!(
                "  {}: {}\n",
                number.red(),
                canonical.get(number).unwrap_or_default()
            ));
        }
    }

    output.push_str(&render_summary(report));
    output
}

fn render_summary(report: &Report) -> String {
    let defects = report.defects();
    let status = if defects == 0 {
        "OK".green().bold().to_string()
    } else {
        "FAIL".red().bold().to_string()
    };
    format!(
        "\n{} {} good, {} different text, {} missing, {} extra\n",
        status,
        report.good.len().to_string().green(),
        report.different_text.len(),
        report.missing.len(),
        report.extra.len()
    )
}

/// Render lint findings as text, one line per finding
pub fn render_lint(findings: &LintFindings) -> String {
    let mut output = String::new();
    for finding in &findings.missing_keywords {
        output.push_str(&format!(
            "{}: Rule {} is missing a RFC 2119 keyword\n",
            finding.file.display(),
            finding.id
        ));
    }
    for file in &findings.malformed {
        output.push_str(&format!(
            "Non json-spec formatted file found: {}\n",
            file.display()
        ));
    }
    output
}
