//! Local applet file enumeration

use crate::checksum::index_file;
use crate::config::CONFIG_FILE_NAMES;
use crate::error::{Result, SignageError};
use crate::types::LocalFile;
use crate::utils::normalize_relative_path;
use futures::stream::{self, StreamExt, TryStreamExt};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-project ignore file, one pattern per line
pub const IGNORE_FILE_NAME: &str = ".signageignore";

/// Always skipped when collecting applet files
pub const DEFAULT_IGNORES: &[&str] = &[".git", "node_modules", ".DS_Store", IGNORE_FILE_NAME];

/// Files hashed concurrently while collecting
const INDEX_CONCURRENCY: usize = 16;

/// Gitignore-style patterns applied on top of `.signageignore` files.
///
/// Defaults and config file names come first, then the config `ignore`
/// list, then the root `.signageignore`, so later lines (including `!`
/// negations) win as they do in a `.gitignore`.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
}

impl IgnoreRules {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new("");
        add_patterns(&mut builder, patterns)?;
        Self::build(builder)
    }

    /// Defaults, config file names, `extra` patterns and the lines of
    /// `.signageignore` in `root` if present
    pub fn for_project(root: &Path, extra: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        add_patterns(&mut builder, DEFAULT_IGNORES.iter().chain(CONFIG_FILE_NAMES.iter()))?;
        add_patterns(&mut builder, extra)?;

        let ignore_file = root.join(IGNORE_FILE_NAME);
        if ignore_file.is_file() {
            if let Some(e) = builder.add(&ignore_file) {
                return Err(SignageError::InvalidConfig(format!(
                    "Invalid {}: {}",
                    ignore_file.display(),
                    e
                )));
            }
        }

        Self::build(builder)
    }

    fn build(builder: GitignoreBuilder) -> Result<Self> {
        let matcher = builder
            .build()
            .map_err(|e| SignageError::InvalidConfig(format!("Invalid ignore rules: {}", e)))?;
        Ok(Self { matcher })
    }

    /// Whether a forward-slash relative path, or any directory above it,
    /// is ignored
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.is_ignored_entry(relative_path, false)
    }

    fn is_ignored_entry(&self, relative_path: &str, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(Path::new(relative_path), is_dir)
            .is_ignore()
    }
}

fn add_patterns<I, S>(builder: &mut GitignoreBuilder, patterns: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }
        builder.add_line(None, pattern).map_err(|e| {
            SignageError::InvalidConfig(format!("Invalid ignore pattern '{}': {}", pattern, e))
        })?;
    }
    Ok(())
}

/// Collect and fingerprint every non-ignored file under `root`, sorted by
/// relative path
pub async fn collect_local_files(root: &Path, rules: &IgnoreRules) -> Result<Vec<LocalFile>> {
    let root = root.to_path_buf();
    let paths = list_paths(&root, rules)?;
    debug!("Indexing {} files under {}", paths.len(), root.display());

    let mut files: Vec<LocalFile> = stream::iter(paths)
        .map(|path| {
            let root = root.clone();
            async move { index_file(&root, &path).await }
        })
        .buffer_unordered(INDEX_CONCURRENCY)
        .try_collect()
        .await?;

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

/// Walk `root` honoring `.signageignore` files at any depth plus `rules`.
/// `.gitignore` and hidden-file filtering stay off: applets often ship
/// build output that git ignores.
fn list_paths(root: &Path, rules: &IgnoreRules) -> Result<Vec<PathBuf>> {
    let filter_root = root.to_path_buf();
    let filter_rules = rules.clone();

    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .add_custom_ignore_filename(IGNORE_FILE_NAME)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let relative = match entry.path().strip_prefix(&filter_root) {
                Ok(p) => normalize_relative_path(&p.to_string_lossy()),
                Err(_) => return true,
            };
            let is_dir = entry.file_type().map_or(false, |t| t.is_dir());
            !filter_rules.is_ignored_entry(&relative, is_dir)
        });

    let mut paths = Vec::new();
    for entry in walker.build() {
        let entry = entry?;
        if entry.file_type().map_or(false, |t| t.is_file()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
