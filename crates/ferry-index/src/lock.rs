//! Advisory lock around staging-index read-modify-write sequences.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{IndexError, IndexResult};

/// Exclusive lock on a staging index file.
///
/// Acquired by creating `<index>.lock` with `create_new`; released when the
/// guard drops. A second acquirer fails fast with [`IndexError::Locked`]
/// instead of waiting.
#[derive(Debug)]
pub struct IndexLock {
    path: PathBuf,
}

impl IndexLock {
    pub fn acquire(index_path: &Path) -> IndexResult<Self> {
        let path = Self::lock_path(index_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(IndexError::Locked { path });
            }
            Err(err) => return Err(err.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        debug!(lock = %path.display(), "index lock acquired");
        Ok(Self { path })
    }

    /// `<index>.lock`, next to the index file.
    pub fn lock_path(index_path: &Path) -> PathBuf {
        let mut name = index_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        index_path.with_file_name(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %err, "failed to release index lock");
        } else {
            debug!(lock = %self.path.display(), "index lock released");
        }
    }
}
