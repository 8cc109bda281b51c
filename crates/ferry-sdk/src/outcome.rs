use std::path::PathBuf;

use ferry_index::SkippedEntry;
use ferry_sync::PushMode;
use ferry_tree::SkippedPath;
use ferry_types::{CommitId, ObjectId, RepositoryId, RepositoryInfo};

use crate::descriptor::WorkingCopyState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitOutcome {
    pub repository: RepositoryId,
    pub name: String,
    pub is_public: bool,
    /// `true` if `.ferryignore` was created by this call.
    pub seeded_ignore_file: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: Vec<String>,
    pub already_staged: Vec<String>,
    /// Patterns that matched no included file. Reported, not fatal.
    pub unmatched_patterns: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
    /// Index size after the call.
    pub staged_total: usize,
}

impl AddOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.unmatched_patterns.is_empty() || !self.skipped.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit: CommitId,
    pub files: Vec<String>,
    /// Staged paths left out because they could not be read.
    pub skipped: Vec<SkippedPath>,
    pub tree_digest: ObjectId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushOutcome {
    pub mode: PushMode,
    /// The local `lastCommitId` that was pushed.
    pub source: CommitId,
    /// The commit now on the remote branch. Differs from `source` on replay.
    pub pushed: CommitId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneOutcome {
    pub commit: CommitId,
    pub written: Vec<String>,
    /// Tree entries that were refused or could not be written.
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReport {
    pub state: WorkingCopyState,
    pub repository: RepositoryInfo,
    pub last_commit: Option<CommitId>,
    pub staged: Vec<String>,
    pub index_path: PathBuf,
}
