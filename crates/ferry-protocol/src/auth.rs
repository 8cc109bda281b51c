//! Signed request envelopes.
//!
//! Every request is signed by the caller's per-invocation [`SessionKey`].
//! The signature covers a REQUEST-domain hash of the nonce, the issue time and
//! the bincode encoding of the request, so a verified envelope cannot have
//! its body swapped.

use std::time::{SystemTime, UNIX_EPOCH};

use ferry_crypto::{ContentHasher, PublicKey, SessionKey, Signature};
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{RpcRequest, PROTOCOL_VERSION};

/// A request plus the caller's identity and signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedRequest {
    pub version: u32,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub issued_at_ms: u64,
    pub request: RpcRequest,
    pub signature: Signature,
}

impl SignedRequest {
    pub fn sign(key: &SessionKey, nonce: u64, request: RpcRequest) -> ProtocolResult<Self> {
        let issued_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let digest = signing_digest(nonce, issued_at_ms, &request)?;
        Ok(Self {
            version: PROTOCOL_VERSION,
            public_key: key.public_key(),
            nonce,
            issued_at_ms,
            request,
            signature: key.sign(&digest),
        })
    }

    /// Check the protocol version and the signature.
    pub fn verify(&self) -> ProtocolResult<()> {
        if self.version != PROTOCOL_VERSION {
            return Err(ProtocolError::VersionMismatch {
                local: PROTOCOL_VERSION,
                remote: self.version,
            });
        }
        let digest = signing_digest(self.nonce, self.issued_at_ms, &self.request)?;
        self.public_key
            .verify(&digest, &self.signature)
            .map_err(|_| ProtocolError::BadSignature)
    }

    /// Principal the service attributes this request to.
    pub fn principal(&self) -> String {
        self.public_key.principal()
    }
}

fn signing_digest(nonce: u64, issued_at_ms: u64, request: &RpcRequest) -> ProtocolResult<[u8; 32]> {
    let body =
        bincode::serialize(request).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    let id = ContentHasher::REQUEST.hash_parts(&[
        &nonce.to_le_bytes(),
        &issued_at_ms.to_le_bytes(),
        &body,
    ]);
    Ok(*id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_types::RepositoryId;

    fn fetch(id: u64) -> RpcRequest {
        RpcRequest::FetchRepository {
            repository: RepositoryId::new(id),
        }
    }

    #[test]
    fn signed_request_verifies() {
        let key = SessionKey::generate();
        let signed = SignedRequest::sign(&key, 1, fetch(1)).unwrap();
        assert!(signed.verify().is_ok());
        assert_eq!(signed.principal(), key.principal());
    }

    #[test]
    fn tampered_body_is_rejected() {
        let key = SessionKey::generate();
        let mut signed = SignedRequest::sign(&key, 1, fetch(1)).unwrap();
        signed.request = fetch(2);
        assert!(matches!(signed.verify(), Err(ProtocolError::BadSignature)));
    }

    #[test]
    fn tampered_nonce_is_rejected() {
        let key = SessionKey::generate();
        let mut signed = SignedRequest::sign(&key, 1, fetch(1)).unwrap();
        signed.nonce = 2;
        assert!(matches!(signed.verify(), Err(ProtocolError::BadSignature)));
    }

    #[test]
    fn other_key_is_rejected() {
        let mut signed = SignedRequest::sign(&SessionKey::generate(), 1, fetch(1)).unwrap();
        signed.public_key = SessionKey::generate().public_key();
        assert!(matches!(signed.verify(), Err(ProtocolError::BadSignature)));
    }

    #[test]
    fn version_mismatch_is_reported() {
        let mut signed = SignedRequest::sign(&SessionKey::generate(), 1, fetch(1)).unwrap();
        signed.version = PROTOCOL_VERSION + 1;
        assert!(matches!(
            signed.verify(),
            Err(ProtocolError::VersionMismatch { .. })
        ));
    }
}
