//! The working-copy descriptor, `.ferry.json`.
//!
//! Records which remote repository a directory belongs to and the last commit
//! this working copy created. Its presence is what makes a directory a working
//! copy; it is never deleted by Ferry.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use ferry_types::{CommitId, RepositoryId};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{SdkError, SdkResult};

pub const DESCRIPTOR_FILE_NAME: &str = ".ferry.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingCopyDescriptor {
    pub repository_id: RepositoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_id: Option<CommitId>,
}

/// Lifecycle of a working copy, derived from its descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkingCopyState {
    /// No descriptor.
    Uninitialized,
    /// Descriptor without a commit.
    Initialized,
    /// Descriptor with `lastCommitId`.
    Committed,
}

impl fmt::Display for WorkingCopyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Committed => write!(f, "committed"),
        }
    }
}

impl WorkingCopyDescriptor {
    pub fn new(repository_id: RepositoryId) -> Self {
        Self {
            repository_id,
            last_commit_id: None,
        }
    }

    pub fn path_in(root: &Path) -> PathBuf {
        root.join(DESCRIPTOR_FILE_NAME)
    }

    /// Read the descriptor under `root`; `None` if the directory is not a
    /// working copy.
    pub fn load(root: &Path) -> SdkResult<Option<Self>> {
        let path = Self::path_in(root);
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SdkError::filesystem(path, err)),
        };
        let descriptor = serde_json::from_slice(&raw)
            .map_err(|e| SdkError::filesystem(&path, format!("unreadable descriptor: {e}")))?;
        Ok(Some(descriptor))
    }

    /// Write the descriptor under `root` via a temp file and rename.
    pub fn save(&self, root: &Path) -> SdkResult<()> {
        let path = Self::path_in(root);
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| SdkError::Internal(format!("cannot encode descriptor: {e}")))?;

        let mut tmp = NamedTempFile::new_in(root).map_err(|e| SdkError::filesystem(root, e))?;
        tmp.write_all(&data)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SdkError::filesystem(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| SdkError::filesystem(&path, e.error))?;
        debug!(descriptor = %path.display(), repository = %self.repository_id, "descriptor saved");
        Ok(())
    }

    pub fn state(&self) -> WorkingCopyState {
        if self.last_commit_id.is_some() {
            WorkingCopyState::Committed
        } else {
            WorkingCopyState::Initialized
        }
    }
}

/// State implied by a possibly missing descriptor.
pub fn state_of(descriptor: Option<&WorkingCopyDescriptor>) -> WorkingCopyState {
    descriptor.map_or(WorkingCopyState::Uninitialized, WorkingCopyDescriptor::state)
}
