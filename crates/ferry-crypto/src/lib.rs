//! Cryptographic primitives for Ferry.
//!
//! Provides domain-separated BLAKE3 hashing for blobs and trees, and the
//! Ed25519 session key every process invocation generates to authenticate
//! itself to the remote service.
//!
//! All crypto operations wrap established libraries -- no custom cryptography.

pub mod hasher;
pub mod signer;

pub use hasher::ContentHasher;
pub use signer::{PublicKey, SessionKey, Signature, SignatureError};
