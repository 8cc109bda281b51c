//! High-level SDK for Ferry.
//!
//! Binds a working-copy directory to a remote repository and runs the
//! version-control workflows against it. This is the entry point for the CLI
//! and for applications embedding Ferry.
//!
//! # Key Types
//!
//! - [`WorkingCopy`]: init, add, commit, push, clone, status, and the branch,
//!   merge, fork and collaborator operations.
//! - [`WorkingCopyDescriptor`]: the `.ferry.json` file binding a directory to
//!   a repository.
//! - [`ClientConfig`]: layered client settings.
//! - [`SdkError`]: every failure, with a stable process exit code.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod outcome;
pub mod workflow;

pub use config::{ClientConfig, ConfigFile};
pub use descriptor::{WorkingCopyDescriptor, WorkingCopyState, DESCRIPTOR_FILE_NAME};
pub use error::{SdkError, SdkResult};
pub use outcome::{AddOutcome, CloneOutcome, CommitOutcome, InitOutcome, PushOutcome, StatusReport};
pub use workflow::{WorkingCopy, SEED_IGNORE_RULES};

// Re-export key types
pub use ferry_index::{SkippedEntry, IGNORE_FILE_NAME};
pub use ferry_sync::{InMemoryRemote, PushMode, RemoteService, RepositorySession};
pub use ferry_tree::SkippedPath;
pub use ferry_types::{BranchInfo, CommitId, RepositoryId, RepositoryInfo, MAIN_BRANCH};
