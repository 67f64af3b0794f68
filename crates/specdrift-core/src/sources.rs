//! Source providers for marker extraction and markdown discovery
//!
//! Every provider visits its files in a fixed order: later markers for the
//! same rule overwrite earlier ones, so the order decides which one wins.

use crate::config::MarkerConfig;
use crate::markers::RepoRuleMap;
use eyre::{Result, WrapErr};
#[cfg(feature = "walk")]
use std::path::Path;
use std::path::PathBuf;

/// Default name of the markdown ignore file, relative to the corpus root
pub const IGNORE_FILE_NAME: &str = ".specignore";

/// Trait for providing source files to extract rule markers from
pub trait Sources {
    /// Extract markers from all sources, in order
    fn extract(self, config: &MarkerConfig) -> Result<RepoRuleMap>;
}

/// Sources from an explicit list of file paths, visited in the given order
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    /// Create from an iterator of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

impl Sources for PathSources {
    fn extract(self, config: &MarkerConfig) -> Result<RepoRuleMap> {
        let mut repo = RepoRuleMap::new();
        for path in self.0 {
            let content = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            repo.add_file(config, &path, &content);
        }
        Ok(repo)
    }
}

/// In-memory sources (useful for testing)
pub struct MemorySources(Vec<(PathBuf, String)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push((path.into(), content.into()));
        self
    }
}

impl Default for MemorySources {
    fn default() -> Self {
        Self::new()
    }
}

impl Sources for MemorySources {
    fn extract(self, config: &MarkerConfig) -> Result<RepoRuleMap> {
        let mut repo = RepoRuleMap::new();
        for (path, content) in self.0 {
            repo.add_file(config, &path, &content);
        }
        Ok(repo)
    }
}

/// Gitignore-aware directory walker over files with the configured extension
#[cfg(feature = "walk")]
pub struct WalkSources {
    root: PathBuf,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Files under the root that carry the configured extension, in
    /// lexicographic path order
    pub fn files(&self, config: &MarkerConfig) -> Result<Vec<PathBuf>> {
        sorted_files(&self.root, |path| config.matches_file(path))
    }
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn extract(self, config: &MarkerConfig) -> Result<RepoRuleMap> {
        let files = self.files(config)?;
        tracing::debug!(root = %self.root.display(), files = files.len(), "scanning sources");

        let mut repo = RepoRuleMap::new();
        for path in files {
            // Unreadable (binary, non-UTF-8) files carry no markers.
            match std::fs::read_to_string(&path) {
                Ok(content) => repo.add_file(config, &path, &content),
                Err(e) => tracing::warn!(file = %path.display(), "skipping unreadable file: {e}"),
            }
        }
        Ok(repo)
    }
}

/// Walk `root` and collect the files accepted by `keep`, sorted by path.
#[cfg(feature = "walk")]
pub(crate) fn sorted_files(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    use ignore::WalkBuilder;

    if !root.exists() {
        eyre::bail!("Failed to walk {}: no such file or directory", root.display());
    }

    let walker = WalkBuilder::new(root)
        .follow_links(true)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(|entry| !is_vcs_dir(entry))
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        // Dangling symlinks, symlink loops and unreadable directories skip
        // only themselves.
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), "skipping unwalkable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_some_and(|t| t.is_file()) && keep(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Version control metadata directories, never scanned
#[cfg(feature = "walk")]
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn", ".jj"];

#[cfg(feature = "walk")]
fn is_vcs_dir(entry: &ignore::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| VCS_DIRS.contains(&name))
}

/// Markdown files of a specification corpus, minus ignored paths
#[cfg(feature = "walk")]
pub struct MarkdownFiles {
    root: PathBuf,
    ignore_file: Option<PathBuf>,
}

#[cfg(feature = "walk")]
impl MarkdownFiles {
    /// Discover markdown under `root`, honoring `root/.specignore` if present
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let ignore_file = Some(root.join(IGNORE_FILE_NAME));
        Self { root, ignore_file }
    }

    /// Use a different ignore file
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_file = Some(path.into());
        self
    }

    /// Ignore nothing
    pub fn no_ignore_file(mut self) -> Self {
        self.ignore_file = None;
        self
    }

    /// All `.md` files under the root, sorted by path
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let ignored = match &self.ignore_file {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read ignore file {}", path.display()))?;
                build_ignore_set(&content)
                    .wrap_err_with(|| format!("Invalid ignore file {}", path.display()))?
            }
            _ => globset::GlobSet::empty(),
        };

        sorted_files(&self.root, |path| {
            path.extension().is_some_and(|ext| ext == "md")
                && !is_ignored(path, &self.root, &ignored)
        })
    }
}

/// One glob per line; blank lines and `#` comments are skipped.
#[cfg(feature = "walk")]
fn build_ignore_set(content: &str) -> Result<globset::GlobSet> {
    let mut builder = globset::GlobSetBuilder::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let pattern = line.trim_end_matches('/');
        let glob = globset::Glob::new(pattern)
            .wrap_err_with(|| format!("Invalid ignore pattern: {line}"))?;
        builder.add(glob);
    }
    builder.build().wrap_err("Failed to build ignore patterns")
}

/// A file is ignored when it, or any directory above it (below the root),
/// matches an ignore pattern.
#[cfg(feature = "walk")]
fn is_ignored(path: &Path, root: &Path, ignored: &globset::GlobSet) -> bool {
    if ignored.is_empty() {
        return false;
    }
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| ignored.is_match(p))
}
