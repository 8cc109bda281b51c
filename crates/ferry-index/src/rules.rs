//! Path exclusion rules.
//!
//! The rule list is rebuilt from scratch by every filtering operation: built-in
//! defaults first, then the working copy's `.ferryignore`. Later rules win, so
//! the override file can re-include a default with a `!` negation.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

use crate::error::{IndexError, IndexResult};

/// Name of the working-copy-local override file.
pub const IGNORE_FILE_NAME: &str = ".ferryignore";

/// Rules every working copy starts with.
pub const DEFAULT_RULES: &[&str] = &[
    // version-control metadata
    ".git/",
    ".hg/",
    ".svn/",
    // dependency trees
    "node_modules/",
    // OS artifacts
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    // ferry's own files
    ".ferry.json",
    IGNORE_FILE_NAME,
    "staged.json",
    "staged.json.lock",
];

/// Evaluates whether a working-copy path participates in version control.
#[derive(Debug)]
pub struct IgnoreFilter {
    root: PathBuf,
    matcher: Gitignore,
    rule_count: usize,
}

impl IgnoreFilter {
    /// Build the filter for the working copy at `root`.
    ///
    /// A missing `.ferryignore` is not an error. Lines in it that fail to
    /// parse are logged and skipped; the remaining rules still apply.
    pub fn load(root: &Path) -> IndexResult<Self> {
        let mut builder = Self::default_builder(root)?;

        let override_file = root.join(IGNORE_FILE_NAME);
        if override_file.is_file() {
            if let Some(err) = builder.add(&override_file) {
                warn!(file = %override_file.display(), error = %err, "some ignore rules were not loaded");
            }
        } else {
            debug!(file = %override_file.display(), "no ignore override file");
        }

        Self::finish(root, builder)
    }

    /// Build a filter from the defaults plus `extra` rules, without reading
    /// any file.
    pub fn with_rules<I, S>(root: &Path, extra: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::default_builder(root)?;
        for line in extra {
            builder
                .add_line(None, line.as_ref())
                .map_err(|e| IndexError::IgnoreRules(e.to_string()))?;
        }
        Self::finish(root, builder)
    }

    fn default_builder(root: &Path) -> IndexResult<GitignoreBuilder> {
        let mut builder = GitignoreBuilder::new(root);
        for rule in DEFAULT_RULES {
            builder
                .add_line(None, rule)
                .map_err(|e| IndexError::IgnoreRules(e.to_string()))?;
        }
        Ok(builder)
    }

    fn finish(root: &Path, builder: GitignoreBuilder) -> IndexResult<Self> {
        let matcher = builder
            .build()
            .map_err(|e| IndexError::IgnoreRules(e.to_string()))?;
        let rule_count = matcher.num_ignores() as usize + matcher.num_whitelists() as usize;
        debug!(rules = rule_count, "ignore rules loaded");
        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            rule_count,
        })
    }

    /// `true` if the file at `path` (relative to the working-copy root)
    /// should be version controlled.
    pub fn should_include(&self, path: &str) -> bool {
        !self.is_ignored(path, false)
    }

    /// Directory variant of [`should_include`](Self::should_include), used to
    /// prune enumeration.
    pub fn should_include_dir(&self, path: &str) -> bool {
        !self.is_ignored(path, true)
    }

    fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let relative = Path::new(path);
        let relative = relative.strip_prefix(&self.root).unwrap_or(relative);
        if relative.as_os_str().is_empty() || relative.has_root() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of active rules, defaults included.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}
