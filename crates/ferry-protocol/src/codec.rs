use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::SignedRequest;
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{RpcResponse, MAX_MESSAGE_SIZE};

/// A message that can travel in a frame.
pub trait Frame: Serialize + DeserializeOwned {
    fn type_tag(&self) -> u8;
}

impl Frame for SignedRequest {
    fn type_tag(&self) -> u8 {
        self.request.type_tag()
    }
}

impl Frame for RpcResponse {
    fn type_tag(&self) -> u8 {
        RpcResponse::type_tag(self)
    }
}

/// Frame encoding: `[4 bytes big-endian len][1 byte tag][bincode payload]`,
/// where `len` counts the tag and the payload.
pub struct FrameCodec;

impl FrameCodec {
    pub fn encode<F: Frame>(msg: &F) -> ProtocolResult<Vec<u8>> {
        let payload =
            bincode::serialize(msg).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(4 + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(msg.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode one frame. Returns the message and the bytes consumed.
    pub fn decode<F: Frame>(data: &[u8]) -> ProtocolResult<(F, usize)> {
        let Some((header, rest)) = data.split_first_chunk::<4>() else {
            return Err(ProtocolError::FramingError("too short".into()));
        };
        let len = u32::from_be_bytes(*header) as usize;
        if len < 1 {
            return Err(ProtocolError::FramingError("zero-length frame".into()));
        }
        if len - 1 > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: len - 1,
                max: MAX_MESSAGE_SIZE,
            });
        }
        if rest.len() < len {
            return Err(ProtocolError::FramingError(format!(
                "incomplete: have {}, need {}",
                data.len(),
                4 + len
            )));
        }

        let tag = rest[0];
        let msg: F = bincode::deserialize(&rest[1..len])
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        if msg.type_tag() != tag {
            return Err(ProtocolError::InvalidMessageType(tag));
        }
        Ok((msg, 4 + len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RpcRequest;
    use chrono::Utc;
    use ferry_crypto::SessionKey;
    use ferry_types::{BranchInfo, CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo};

    fn signed(request: RpcRequest) -> SignedRequest {
        SignedRequest::sign(&SessionKey::generate(), 7, request).unwrap()
    }

    #[test]
    fn submit_commit_request_survives_framing() {
        let request = RpcRequest::SubmitCommit {
            repository: RepositoryId::new(1),
            branch: "main".into(),
            files: vec![("a.txt".into(), FileBlob::new("a.txt", "alpha", "text/plain"))],
            message: "first".into(),
        };
        let encoded = FrameCodec::encode(&signed(request.clone())).unwrap();
        let (decoded, consumed): (SignedRequest, usize) = FrameCodec::decode(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded.request, request);
        decoded.verify().unwrap();
    }

    #[test]
    fn commit_response_survives_framing() {
        let snapshot = CommitSnapshot {
            id: CommitId::new("42").unwrap(),
            tree: [("a.txt".to_string(), FileBlob::new("a.txt", "alpha", "text/plain"))]
                .into_iter()
                .collect(),
            parent: Some(CommitId::new("41").unwrap()),
            message: "msg".into(),
            author: "ed25519:00".into(),
            timestamp: Utc::now(),
        };
        let response = RpcResponse::Commit(snapshot);
        let encoded = FrameCodec::encode(&response).unwrap();
        let (decoded, _): (RpcResponse, usize) = FrameCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn repository_response_survives_framing() {
        let response = RpcResponse::Repository(RepositoryInfo {
            id: RepositoryId::new(9),
            name: "demo".into(),
            owner: "alice".into(),
            is_public: true,
            collaborators: vec!["bob".into()],
            branches: vec![BranchInfo { name: "main".into(), head: None }],
        });
        let encoded = FrameCodec::encode(&response).unwrap();
        let (decoded, _): (RpcResponse, usize) = FrameCodec::decode(&encoded).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn decode_truncated() {
        let err = FrameCodec::decode::<RpcResponse>(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_zero_length() {
        let err = FrameCodec::decode::<RpcResponse>(&[0, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_incomplete_frame() {
        let mut encoded = FrameCodec::encode(&RpcResponse::Ack).unwrap();
        encoded[3] += 10;
        let err = FrameCodec::decode::<RpcResponse>(&encoded).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_rejects_mismatched_tag() {
        let mut encoded = FrameCodec::encode(&RpcResponse::Ack).unwrap();
        encoded[4] = 1;
        let err = FrameCodec::decode::<RpcResponse>(&encoded).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessageType(1)));
    }
}
