//! The persisted set of staged paths.
//!
//! The [`StagingIndex`] is the sole source of truth for what the next commit
//! will contain. It is loaded at the start of an operation, mutated in memory,
//! and saved atomically at the end; no copy outlives the operation.

use std::collections::BTreeSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ferry_types::normalize_relative;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{IndexError, IndexResult};
use crate::outcome::StagingOutcome;
use crate::rules::IgnoreFilter;
use crate::walk::enumerate_files;

/// File name of the persisted index inside its per-user data directory.
pub const INDEX_FILE_NAME: &str = "staged.json";

/// The staging index: relative paths slated for the next commit.
///
/// On disk this is a JSON array of path strings. Entries are kept in a
/// `BTreeSet` so the file is written in a stable order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagingIndex {
    path: PathBuf,
    entries: BTreeSet<String>,
}

impl StagingIndex {
    /// An empty index that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeSet::new(),
        }
    }

    /// Load the index persisted at `path`. A missing file is an empty index.
    pub fn load(path: impl Into<PathBuf>) -> IndexResult<Self> {
        let path = path.into();
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(index = %path.display(), "no staging index on disk, starting empty");
                return Ok(Self::new(path));
            }
            Err(err) => return Err(err.into()),
        };

        let listed: Vec<String> =
            serde_json::from_slice(&raw).map_err(|e| IndexError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let mut entries = BTreeSet::new();
        for raw in &listed {
            match normalize_relative(raw) {
                Some(p) => {
                    entries.insert(p);
                }
                None => {
                    warn!(index = %path.display(), entry = %raw, "dropping invalid staged path");
                }
            }
        }
        debug!(index = %path.display(), entries = entries.len(), "staging index loaded");
        Ok(Self { path, entries })
    }

    /// Atomically persist the full set: write a sibling temp file, then rename
    /// it over the index.
    pub fn save(&self) -> IndexResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let listed: Vec<&String> = self.entries.iter().collect();
        let data = serde_json::to_vec_pretty(&listed)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| IndexError::Io(e.error))?;
        debug!(index = %self.path.display(), entries = self.entries.len(), "staging index saved");
        Ok(())
    }

    /// Insert every path not already present.
    ///
    /// Paths are validated before any insertion, so an invalid path leaves the
    /// index unchanged. Duplicates, within the call or against the index, are
    /// reported as already staged.
    pub fn add_paths<I, S>(&mut self, paths: I) -> IndexResult<StagingOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized = paths
            .into_iter()
            .map(|p| {
                let raw = p.as_ref();
                normalize_relative(raw).ok_or_else(|| IndexError::InvalidPath(raw.to_string()))
            })
            .collect::<IndexResult<Vec<String>>>()?;

        let mut outcome = StagingOutcome::new();
        for path in normalized {
            if self.entries.contains(&path) {
                outcome.already_staged.push(path);
            } else {
                self.entries.insert(path.clone());
                outcome.added.push(path);
            }
        }
        Ok(outcome)
    }

    /// Stage every file under `root` that the filter includes.
    pub fn add_all(&mut self, root: &Path, filter: &IgnoreFilter) -> IndexResult<StagingOutcome> {
        let found = enumerate_files(root, filter);
        let mut outcome = self.add_paths(&found.files)?;
        outcome.skipped = found.skipped;
        info!(
            added = outcome.added.len(),
            already_staged = outcome.already_staged.len(),
            "staged working copy"
        );
        Ok(outcome)
    }

    /// Stage every included file under `root` whose relative path contains
    /// `pattern`.
    pub fn add_matching(
        &mut self,
        root: &Path,
        filter: &IgnoreFilter,
        pattern: &str,
    ) -> IndexResult<StagingOutcome> {
        let found = enumerate_files(root, filter);
        let matching: Vec<&String> = found
            .files
            .iter()
            .filter(|path| path.contains(pattern))
            .collect();
        let mut outcome = self.add_paths(matching)?;
        outcome.skipped = found.skipped;
        debug!(pattern, matched = outcome.matched(), "staged matching paths");
        Ok(outcome)
    }

    /// Drop every entry. Only called once a commit has been accepted remotely.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &str) -> bool {
        normalize_relative(path).is_some_and(|p| self.entries.contains(&p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Staged paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Where this index persists.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
