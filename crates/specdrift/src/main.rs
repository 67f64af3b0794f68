//! specdrift - Detect drift between a specification and its implementations
//!
//! specdrift extracts the normative rules of a markdown specification into
//! JSON, and checks an implementation's source comments against the
//! published rules: every rule should be quoted, verbatim, exactly once.

mod output;

use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use specdrift_core::reconcile::report_file_name;
use specdrift_core::{
    CanonicalRuleMap, DEFAULT_SPEC_URL, MarkdownFiles, MarkerConfig, Report, RuleCorpus, RuleNode,
    SPEC_FILE_NAME, SpecDocument, Sources, WalkSources, lint_dir,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: specdrift [--verbose] <check|parse|lint> [OPTIONS]";

/// Arguments of `specdrift check`
#[derive(Debug, facet::Facet)]
struct CheckArgs {
    /// Directory holding `.specrc` and the implementation sources
    #[facet(named, short = 'd')]
    code_directory: PathBuf,

    /// Download the specification even if a cached copy exists
    #[facet(named, default)]
    refresh_spec: bool,

    /// Print the published and quoted text of every drifted rule
    #[facet(named, default)]
    diff_output: bool,

    /// Write the report to `<extension>-report.json` in the code directory
    #[facet(named, default)]
    json_report: bool,

    /// Where to download the specification from
    #[facet(named, default)]
    spec_url: Option<String>,

    /// Log every skipped heading, marker and file
    #[facet(named, short = 'v', default)]
    verbose: bool,

    /// Only check these rule numbers
    #[facet(positional, default)]
    ids: Vec<String>,
}

/// Arguments of `specdrift parse`
#[derive(Debug, facet::Facet)]
struct ParseArgs {
    /// Root of the markdown corpus (default: current directory)
    #[facet(positional, default)]
    root: Option<PathBuf>,

    /// Write one sorted `specification.json` instead of one JSON per document
    #[facet(named, default)]
    combined: bool,

    /// Globs of markdown paths to skip (default: <root>/.specignore)
    #[facet(named, default)]
    ignore_file: Option<PathBuf>,

    /// Log every skipped heading, marker and file
    #[facet(named, short = 'v', default)]
    verbose: bool,
}

/// Arguments of `specdrift lint`
#[derive(Debug, facet::Facet)]
struct LintArgs {
    /// Directory to search for JSON files
    #[facet(positional)]
    dir: PathBuf,

    /// Log every skipped heading, marker and file
    #[facet(named, short = 'v', default)]
    verbose: bool,
}

/// Subcommands
#[derive(Debug)]
enum Command {
    /// Compare the rules quoted in an implementation with the published specification
    Check(CheckArgs),
    /// Extract rules from markdown spec documents into specification JSON
    Parse(ParseArgs),
    /// Check generated specification JSON for rules without a normative keyword
    Lint(LintArgs),
}

impl Command {
    fn verbose(&self) -> bool {
        match self {
            Command::Check(args) => args.verbose,
            Command::Parse(args) => args.verbose,
            Command::Lint(args) => args.verbose,
        }
    }
}

/// Parse the command line (without the program name).
///
/// `--verbose` may come before the subcommand name; everything after the
/// name goes to that subcommand's own argument struct.
fn parse_command(args: &[&str]) -> Result<(Command, bool)> {
    let mut verbose = false;
    let mut rest = args;
    while let Some((first, tail)) = rest.split_first() {
        match *first {
            "-v" | "--verbose" => verbose = true,
            flag if flag.starts_with('-') => {
                eyre::bail!("Unknown option {flag} before the command. {USAGE}")
            }
            _ => break,
        }
        rest = tail;
    }

    let Some((name, sub_args)) = rest.split_first() else {
        eyre::bail!("No command specified. {USAGE}");
    };
    let command = match *name {
        "check" => Command::Check(parse_args(name, sub_args)?),
        "parse" => Command::Parse(parse_args(name, sub_args)?),
        "lint" => Command::Lint(parse_args(name, sub_args)?),
        other => eyre::bail!("Unknown command `{other}`. {USAGE}"),
    };
    let verbose = verbose || command.verbose();
    Ok((command, verbose))
}

fn parse_args<T: facet::Facet<'static>>(name: &str, args: &[&str]) -> Result<T> {
    facet_args::from_slice(args)
        .map_err(|e| eyre::eyre!("Failed to parse arguments of `{name}`: {e:?}. {USAGE}"))
}

fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let raw: Vec<&str> = raw.iter().map(String::as_str).collect();
    let (command, verbose) = parse_command(&raw)?;

    init_logging(verbose);

    let failures = match command {
        Command::Check(args) => run_check_command(args)?,
        Command::Parse(args) => run_parse_command(args.root, args.combined, args.ignore_file)?,
        Command::Lint(args) => run_lint_command(&args.dir)?,
    };

    if failures > 0 {
        std::process::exit(exit_code(failures));
    }
    Ok(())
}

/// Logs go to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Process exit status for a failure count; saturates so that 256 failures
/// never read as success.
fn exit_code(failures: usize) -> i32 {
    failures.min(255) as i32
}

fn run_check_command(opts: CheckArgs) -> Result<usize> {
    let code_dir = &opts.code_directory;
    if !code_dir.is_dir() {
        eyre::bail!("Code directory {} does not exist", code_dir.display());
    }

    let config = MarkerConfig::load_from_dir(code_dir)?;

    let cache = code_dir.join(SPEC_FILE_NAME);
    let url = opts.spec_url.as_deref().unwrap_or(DEFAULT_SPEC_URL);
    eprintln!(
        "{} Loading specification from {}...",
        "->".blue().bold(),
        cache.display()
    );
    let doc = SpecDocument::load_or_fetch(&cache, url, opts.refresh_spec)?;
    let canonical = CanonicalRuleMap::from_document(&doc);
    eprintln!(
        "   Found {} rules in spec",
        canonical.len().to_string().green()
    );

    eprintln!(
        "{} Scanning {} files...",
        "->".blue().bold(),
        format!(".{}", config.file_extension).cyan()
    );
    let repo = WalkSources::new(code_dir).extract(&config)?;
    eprintln!("   Found {} rule markers", repo.len().to_string().green());

    if !repo.duplicates.is_empty() {
        eprintln!(
            "\n{} Found {} rules quoted more than once:",
            "!".yellow().bold(),
            repo.duplicates.len()
        );
        for dup in &repo.duplicates {
            eprintln!(
                "   {} quoted in {} and {}",
                dup.number.red(),
                dup.first.display(),
                dup.second.display()
            );
        }
    }

    let report = Report::compute(&canonical, &repo, &opts.ids);
    print!(
        "{}",
        output::render_report(&report, &canonical, &repo, opts.diff_output)
    );

    if opts.json_report {
        let path = code_dir.join(report_file_name(&config.file_extension));
        report.write(&path)?;
        eprintln!("   Wrote report to {}", path.display());
    }

    Ok(report.defects())
}

fn run_parse_command(
    root: Option<PathBuf>,
    combined: bool,
    ignore_file: Option<PathBuf>,
) -> Result<usize> {
    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let mut discovery = MarkdownFiles::new(&root);
    if let Some(path) = ignore_file {
        discovery = discovery.ignore_file(path);
    }
    let files = discovery.discover()?;
    if files.is_empty() {
        eyre::bail!("No markdown files found under {}", root.display());
    }

    let mut corpus = RuleCorpus::new();
    let mut all_duplicates = Vec::new();

    for file_path in &files {
        eprintln!(
            "{} Processing {}...",
            "->".blue().bold(),
            file_path.display()
        );

        let markdown = std::fs::read_to_string(file_path)
            .wrap_err_with(|| format!("Failed to read {}", file_path.display()))?;
        let rules = RuleNode::parse_markdown(&markdown);
        eprintln!("   Found {} rules", rules.len().to_string().green());

        all_duplicates.extend(corpus.add(file_path, rules));
    }

    // Duplicates are reported but do not fail the run
    if !all_duplicates.is_empty() {
        eprintln!(
            "\n{} Found {} duplicate machine ids:",
            "!".yellow().bold(),
            all_duplicates.len()
        );
        for dup in &all_duplicates {
            eprintln!(
                "   {} defined in {} and {}",
                dup.machine_id.red(),
                dup.first.display(),
                dup.second.display()
            );
        }
    }

    if combined {
        let out_path = root.join(SPEC_FILE_NAME);
        let doc = SpecDocument {
            rules: corpus.combined(),
        };
        doc.write(&out_path)?;
        eprintln!(
            "\n{} Wrote {} rules to {}",
            "OK".green().bold(),
            doc.len(),
            out_path.display()
        );
    } else {
        let mut written = 0;
        for (md_path, rules) in &corpus.documents {
            if rules.is_empty() {
                continue;
            }
            let out_path = md_path.with_extension("json");
            SpecDocument::from_rules(rules).write(&out_path)?;
            tracing::info!(path = %out_path.display(), rules = rules.len(), "wrote specification");
            written += 1;
        }
        eprintln!(
            "\n{} Wrote {} specification files",
            "OK".green().bold(),
            written
        );
    }

    Ok(0)
}

fn run_lint_command(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        eyre::bail!("Directory {} does not exist", dir.display());
    }

    eprintln!(
        "{} Linting specification JSON under {}...",
        "->".blue().bold(),
        dir.display()
    );
    let findings = lint_dir(dir)?;
    eprint!("{}", output::render_lint(&findings));
    eprintln!(
        "   Checked {} files, {} errors",
        findings.files,
        findings.errors().to_string().red()
    );

    Ok(findings.errors())
}
