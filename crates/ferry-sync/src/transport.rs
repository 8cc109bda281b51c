use async_trait::async_trait;
use ferry_types::{CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo};

use crate::error::RemoteResult;

/// The operations the remote repository service exposes.
///
/// Every call is a single request/response exchange. Implementations must
/// report service-side refusals as [`RemoteError::Rejected`] with the
/// service's reason unchanged.
///
/// [`RemoteError::Rejected`]: crate::RemoteError::Rejected
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Principal the service attributes this caller's requests to.
    fn principal(&self) -> String;

    async fn create_repository(&self, name: &str, is_public: bool) -> RemoteResult<RepositoryId>;

    async fn submit_commit(
        &self,
        repository: RepositoryId,
        branch: &str,
        files: Vec<(String, FileBlob)>,
        message: &str,
    ) -> RemoteResult<CommitId>;

    async fn create_branch(&self, repository: RepositoryId, source: &str, name: &str) -> RemoteResult<()>;

    async fn merge_branch(&self, repository: RepositoryId, source: &str, target: &str) -> RemoteResult<()>;

    async fn fork_repository(&self, repository: RepositoryId, name: &str) -> RemoteResult<RepositoryId>;

    async fn add_collaborator(&self, repository: RepositoryId, principal: &str) -> RemoteResult<()>;

    async fn fetch_repository(&self, repository: RepositoryId) -> RemoteResult<RepositoryInfo>;

    async fn fetch_commit(&self, repository: RepositoryId, commit: &CommitId) -> RemoteResult<CommitSnapshot>;

    async fn push_commit(&self, repository: RepositoryId, branch: &str, commit: &CommitId) -> RemoteResult<()>;
}
