//! Content-addressed snapshots of staged files.
//!
//! The [`TreeBuilder`] reads every path in the staging index and assembles a
//! [`Tree`]: an ordered mapping from path to [`FileBlob`]. The tree is
//! transient; it exists for the duration of one submit call.
//!
//! # Design Rules
//!
//! 1. A file that cannot be read is skipped with a warning; the build goes on.
//! 2. No network I/O and no persisted state.
//! 3. Iteration order and [`Tree::digest`] depend only on paths and content.
//!
//! [`FileBlob`]: ferry_types::FileBlob

pub mod builder;
pub mod content_type;
pub mod error;
pub mod tree;

pub use builder::{SkippedPath, TreeBuild, TreeBuilder};
pub use content_type::content_type_for;
pub use error::{TreeError, TreeResult};
pub use tree::{blob_id, Tree};
