//! Remote repository session for Ferry.
//!
//! The remote service owns the commit graph, branch pointers and merge logic.
//! This crate gives the client a typed view of it:
//!
//! - [`RemoteService`]: the nine operations the service exposes.
//! - [`RepositorySession`]: the handle workflows use; logs every call and
//!   never retries.
//! - [`InMemoryRemote`]: a complete in-process service for tests and embedding.
//! - [`HttpRemote`]: signed, framed RPC over HTTPS.

pub mod error;
pub mod http;
pub mod memory;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{RemoteError, RemoteResult};
pub use http::HttpRemote;
pub use memory::InMemoryRemote;
pub use session::RepositorySession;
pub use transport::RemoteService;
pub use types::PushMode;
