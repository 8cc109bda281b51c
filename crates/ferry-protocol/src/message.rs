use serde::{Deserialize, Serialize};
use ferry_types::{CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Operations the remote repository service exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcRequest {
    CreateRepository {
        name: String,
        is_public: bool,
    },
    SubmitCommit {
        repository: RepositoryId,
        branch: String,
        files: Vec<(String, FileBlob)>,
        message: String,
    },
    CreateBranch {
        repository: RepositoryId,
        source: String,
        name: String,
    },
    MergeBranch {
        repository: RepositoryId,
        source: String,
        target: String,
    },
    ForkRepository {
        repository: RepositoryId,
        name: String,
    },
    AddCollaborator {
        repository: RepositoryId,
        principal: String,
    },
    FetchRepository {
        repository: RepositoryId,
    },
    FetchCommit {
        repository: RepositoryId,
        commit: CommitId,
    },
    PushCommit {
        repository: RepositoryId,
        branch: String,
        commit: CommitId,
    },
}

/// Replies from the remote service. Every request gets exactly one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcResponse {
    RepositoryCreated { repository: RepositoryId },
    CommitSubmitted { commit: CommitId },
    Forked { repository: RepositoryId },
    Repository(RepositoryInfo),
    Commit(CommitSnapshot),
    Ack,
    /// The service refused the request. `message` is shown to the user verbatim.
    Error { code: u32, message: String },
}

/// Codes carried by [`RpcResponse::Error`].
pub mod error_codes {
    pub const BAD_REQUEST: u32 = 400;
    pub const UNAUTHORIZED: u32 = 401;
    pub const FORBIDDEN: u32 = 403;
    pub const NOT_FOUND: u32 = 404;
    pub const CONFLICT: u32 = 409;
    pub const INTERNAL: u32 = 500;
}

impl RpcRequest {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::CreateRepository { .. } => 1,
            Self::SubmitCommit { .. } => 2,
            Self::CreateBranch { .. } => 3,
            Self::MergeBranch { .. } => 4,
            Self::ForkRepository { .. } => 5,
            Self::AddCollaborator { .. } => 6,
            Self::FetchRepository { .. } => 7,
            Self::FetchCommit { .. } => 8,
            Self::PushCommit { .. } => 9,
        }
    }

    /// Operation name, as used in logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateRepository { .. } => "createRepository",
            Self::SubmitCommit { .. } => "submitCommit",
            Self::CreateBranch { .. } => "createBranch",
            Self::MergeBranch { .. } => "mergeBranch",
            Self::ForkRepository { .. } => "forkRepository",
            Self::AddCollaborator { .. } => "addCollaborator",
            Self::FetchRepository { .. } => "fetchRepository",
            Self::FetchCommit { .. } => "fetchCommit",
            Self::PushCommit { .. } => "pushCommit",
        }
    }
}

impl RpcResponse {
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::RepositoryCreated { .. } => 101,
            Self::CommitSubmitted { .. } => 102,
            Self::Forked { .. } => 103,
            Self::Repository(_) => 104,
            Self::Commit(_) => 105,
            Self::Ack => 106,
            Self::Error { .. } => 255,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RepositoryCreated { .. } => "RepositoryCreated",
            Self::CommitSubmitted { .. } => "CommitSubmitted",
            Self::Forked { .. } => "Forked",
            Self::Repository(_) => "Repository",
            Self::Commit(_) => "Commit",
            Self::Ack => "Ack",
            Self::Error { .. } => "Error",
        }
    }

    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepositoryId {
        RepositoryId::new(1)
    }

    fn commit() -> CommitId {
        CommitId::new("c1").unwrap()
    }

    #[test]
    fn request_tags_unique() {
        let requests = vec![
            RpcRequest::CreateRepository { name: "r".into(), is_public: true },
            RpcRequest::SubmitCommit { repository: repo(), branch: "main".into(), files: vec![], message: "m".into() },
            RpcRequest::CreateBranch { repository: repo(), source: "main".into(), name: "dev".into() },
            RpcRequest::MergeBranch { repository: repo(), source: "dev".into(), target: "main".into() },
            RpcRequest::ForkRepository { repository: repo(), name: "f".into() },
            RpcRequest::AddCollaborator { repository: repo(), principal: "bob".into() },
            RpcRequest::FetchRepository { repository: repo() },
            RpcRequest::FetchCommit { repository: repo(), commit: commit() },
            RpcRequest::PushCommit { repository: repo(), branch: "main".into(), commit: commit() },
        ];
        let mut tags: Vec<u8> = requests.iter().map(RpcRequest::type_tag).collect();
        let len = tags.len();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), len, "request tags should be unique");
    }

    #[test]
    fn response_tags_do_not_overlap_requests() {
        let responses = vec![
            RpcResponse::RepositoryCreated { repository: repo() },
            RpcResponse::CommitSubmitted { commit: commit() },
            RpcResponse::Forked { repository: repo() },
            RpcResponse::Ack,
            RpcResponse::error(404, "missing"),
        ];
        assert!(responses.iter().all(|r| r.type_tag() > 100));
    }

    #[test]
    fn type_names() {
        assert_eq!(RpcRequest::FetchRepository { repository: repo() }.type_name(), "fetchRepository");
        assert_eq!(RpcResponse::Ack.type_name(), "Ack");
    }
}
