//! Wire protocol for Ferry.
//!
//! Defines the RPC messages exchanged with the remote repository service, the
//! signed envelope every request travels in, and the length-prefixed framing
//! used on the wire.

pub mod auth;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use auth::SignedRequest;
pub use codec::{Frame, FrameCodec};
pub use endpoint::{endpoints, FRAME_CONTENT_TYPE};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{error_codes, RpcRequest, RpcResponse, MAX_MESSAGE_SIZE, PROTOCOL_VERSION};
