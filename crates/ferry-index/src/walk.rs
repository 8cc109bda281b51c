//! Recursive working-copy enumeration.

use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::outcome::SkippedEntry;
use crate::rules::IgnoreFilter;

/// Reason recorded for symlinks found during a walk.
pub const SYMLINK_NOT_FOLLOWED: &str = "symbolic link not followed";

/// Files found under a working-copy root.
#[derive(Clone, Debug, Default)]
pub struct Enumeration {
    /// Relative, slash-normalized paths of every non-ignored regular file.
    pub files: Vec<String>,
    /// Entries that could not be read; reported as warnings.
    pub skipped: Vec<SkippedEntry>,
}

/// Walk `root` and collect every regular file the filter includes.
///
/// Ignored directories are pruned rather than descended. Symlinks are not
/// followed; included ones are recorded in `skipped` next to unreadable
/// entries, and the walk carries on.
pub fn enumerate_files(root: &Path, filter: &IgnoreFilter) -> Enumeration {
    let mut result = Enumeration::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match relative(root, entry.path()) {
                Some(rel) => filter.should_include_dir(&rel),
                None => false,
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .and_then(|p| relative(root, p))
                    .unwrap_or_else(|| root.display().to_string());
                warn!(path = %path, error = %err, "skipping unreadable entry");
                result.skipped.push(SkippedEntry::new(path, err.to_string()));
                continue;
            }
        };

        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }
        let Some(rel) = relative(root, entry.path()) else {
            continue;
        };
        if !filter.should_include(&rel) {
            continue;
        }
        if file_type.is_symlink() {
            warn!(path = %rel, "skipping symbolic link");
            result.skipped.push(SkippedEntry::new(rel, SYMLINK_NOT_FOLLOWED));
            continue;
        }
        result.files.push(rel);
    }

    result
}

/// Joins components with `/` so separators never depend on the platform.
fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    ferry_types::normalize_relative(&joined)
}
