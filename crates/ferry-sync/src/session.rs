use std::sync::Arc;

use ferry_types::{CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo};
use tracing::{debug, warn};

use crate::error::RemoteResult;
use crate::transport::RemoteService;

/// The workflows' handle on the remote service.
///
/// A thin, cloneable wrapper: each call is logged and forwarded once. Retries
/// are never attempted, so a failed call has had no local side effects.
#[derive(Clone)]
pub struct RepositorySession {
    remote: Arc<dyn RemoteService>,
}

fn logged<T>(operation: &'static str, result: RemoteResult<T>) -> RemoteResult<T> {
    match &result {
        Ok(_) => debug!(operation, "remote call succeeded"),
        Err(err) => warn!(operation, error = %err, "remote call failed"),
    }
    result
}

impl RepositorySession {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    pub fn principal(&self) -> String {
        self.remote.principal()
    }

    pub async fn create_repository(&self, name: &str, is_public: bool) -> RemoteResult<RepositoryId> {
        debug!(name, is_public, "createRepository");
        logged("createRepository", self.remote.create_repository(name, is_public).await)
    }

    pub async fn submit_commit(
        &self,
        repository: RepositoryId,
        branch: &str,
        files: Vec<(String, FileBlob)>,
        message: &str,
    ) -> RemoteResult<CommitId> {
        debug!(%repository, branch, files = files.len(), "submitCommit");
        logged(
            "submitCommit",
            self.remote.submit_commit(repository, branch, files, message).await,
        )
    }

    pub async fn create_branch(&self, repository: RepositoryId, source: &str, name: &str) -> RemoteResult<()> {
        debug!(%repository, source, name, "createBranch");
        logged("createBranch", self.remote.create_branch(repository, source, name).await)
    }

    pub async fn merge_branch(&self, repository: RepositoryId, source: &str, target: &str) -> RemoteResult<()> {
        debug!(%repository, source, target, "mergeBranch");
        logged("mergeBranch", self.remote.merge_branch(repository, source, target).await)
    }

    pub async fn fork_repository(&self, repository: RepositoryId, name: &str) -> RemoteResult<RepositoryId> {
        debug!(%repository, name, "forkRepository");
        logged("forkRepository", self.remote.fork_repository(repository, name).await)
    }

    pub async fn add_collaborator(&self, repository: RepositoryId, principal: &str) -> RemoteResult<()> {
        debug!(%repository, principal, "addCollaborator");
        logged("addCollaborator", self.remote.add_collaborator(repository, principal).await)
    }

    pub async fn fetch_repository(&self, repository: RepositoryId) -> RemoteResult<RepositoryInfo> {
        debug!(%repository, "fetchRepository");
        logged("fetchRepository", self.remote.fetch_repository(repository).await)
    }

    pub async fn fetch_commit(&self, repository: RepositoryId, commit: &CommitId) -> RemoteResult<CommitSnapshot> {
        debug!(%repository, %commit, "fetchCommit");
        logged("fetchCommit", self.remote.fetch_commit(repository, commit).await)
    }

    pub async fn push_commit(&self, repository: RepositoryId, branch: &str, commit: &CommitId) -> RemoteResult<()> {
        debug!(%repository, branch, %commit, "pushCommit");
        logged("pushCommit", self.remote.push_commit(repository, branch, commit).await)
    }
}
