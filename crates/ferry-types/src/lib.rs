//! Foundation types for Ferry.
//!
//! Every other Ferry crate depends on `ferry-types`. The types here are the
//! vocabulary shared between the local working copy and the remote
//! repository service.
//!
//! # Key Types
//!
//! - [`RepositoryId`] -- Opaque numeric identifier assigned by the remote service
//! - [`CommitId`] -- Opaque commit identifier assigned by the remote service
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`FileBlob`] -- A single file's path, text content, and content type
//! - [`CommitSnapshot`] -- A commit record as returned by the remote service
//! - [`RepositoryInfo`] -- Repository metadata (name, owner, visibility, branches)

pub mod blob;
pub mod commit;
pub mod error;
pub mod ids;
pub mod object;
pub mod path;
pub mod repository;

pub use blob::FileBlob;
pub use commit::CommitSnapshot;
pub use error::TypeError;
pub use ids::{CommitId, RepositoryId, MAIN_BRANCH};
pub use object::ObjectId;
pub use path::normalize_relative;
pub use repository::{BranchInfo, RepositoryInfo};
