//! Staging index for Ferry.
//!
//! Decides which working-copy paths participate in version control and keeps
//! the persisted set of paths slated for the next commit.
//!
//! # Key Types
//!
//! - [`IgnoreFilter`] -- Default rules plus the working copy's `.ferryignore`
//! - [`StagingIndex`] -- The persisted set of staged relative paths
//! - [`StagingOutcome`] -- What an add call did: newly staged, already staged, skipped
//! - [`IndexLock`] -- Advisory lock held around load-mutate-save sequences

pub mod error;
pub mod index;
pub mod lock;
pub mod outcome;
pub mod rules;
pub mod walk;

pub use error::{IndexError, IndexResult};
pub use index::{StagingIndex, INDEX_FILE_NAME};
pub use lock::IndexLock;
pub use outcome::{SkippedEntry, StagingOutcome};
pub use rules::{IgnoreFilter, DEFAULT_RULES, IGNORE_FILE_NAME};
pub use walk::{enumerate_files, Enumeration};
