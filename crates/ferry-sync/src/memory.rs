use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use ferry_types::{
    BranchInfo, CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo, MAIN_BRANCH,
};
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::transport::RemoteService;

/// An in-process repository service.
///
/// Intended for tests and embedding. Repositories are numbered from 1 and
/// start with an empty `main` branch; commit ids are sequential decimal
/// strings shared across all repositories. Merges fast-forward the target to
/// the source head.
pub struct InMemoryRemote {
    principal: String,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_repository: u64,
    next_commit: u64,
    repositories: BTreeMap<RepositoryId, StoredRepository>,
    reject_next: Option<String>,
    calls: Vec<&'static str>,
}

#[derive(Clone)]
struct StoredRepository {
    info: RepositoryInfo,
    commits: HashMap<CommitId, CommitSnapshot>,
}

impl StoredRepository {
    fn branch_mut(&mut self, name: &str) -> RemoteResult<&mut BranchInfo> {
        let id = self.info.id;
        self.info
            .branches
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| RemoteError::rejected(format!("branch {name} not found in repository {id}")))
    }

    fn head(&self, name: &str) -> RemoteResult<Option<CommitId>> {
        self.info
            .branch(name)
            .map(|b| b.head.clone())
            .ok_or_else(|| {
                RemoteError::rejected(format!("branch {name} not found in repository {}", self.info.id))
            })
    }
}

impl State {
    fn repository(&self, id: RepositoryId) -> RemoteResult<&StoredRepository> {
        self.repositories
            .get(&id)
            .ok_or_else(|| RemoteError::rejected(format!("repository {id} not found")))
    }

    fn repository_mut(&mut self, id: RepositoryId) -> RemoteResult<&mut StoredRepository> {
        self.repositories
            .get_mut(&id)
            .ok_or_else(|| RemoteError::rejected(format!("repository {id} not found")))
    }

    fn allocate_repository(&mut self) -> RepositoryId {
        self.next_repository += 1;
        RepositoryId::new(self.next_repository)
    }

    fn allocate_commit(&mut self) -> RemoteResult<CommitId> {
        self.next_commit += 1;
        CommitId::new(self.next_commit.to_string())
            .map_err(|e| RemoteError::Transport(e.to_string()))
    }
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::with_principal("local")
    }

    /// A service that attributes every request to `principal`.
    pub fn with_principal(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Make the next call fail with `reason`, whatever it is.
    pub fn reject_next(&self, reason: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.reject_next = Some(reason.into());
        }
    }

    /// Operation names received so far, oldest first.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Number of repositories held, forks included.
    pub fn repository_count(&self) -> usize {
        self.state.lock().map(|s| s.repositories.len()).unwrap_or_default()
    }

    fn begin(&self, operation: &'static str) -> RemoteResult<MutexGuard<'_, State>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RemoteError::Transport("in-memory remote state poisoned".into()))?;
        state.calls.push(operation);
        if let Some(reason) = state.reject_next.take() {
            debug!(operation, %reason, "injected rejection");
            return Err(RemoteError::Rejected(reason));
        }
        Ok(state)
    }

    fn do_create_repository(&self, name: &str, is_public: bool) -> RemoteResult<RepositoryId> {
        let mut state = self.begin("createRepository")?;
        if name.trim().is_empty() {
            return Err(RemoteError::rejected("repository name must not be empty"));
        }
        let id = state.allocate_repository();
        state.repositories.insert(
            id,
            StoredRepository {
                info: RepositoryInfo {
                    id,
                    name: name.to_string(),
                    owner: self.principal.clone(),
                    is_public,
                    collaborators: Vec::new(),
                    branches: vec![BranchInfo {
                        name: MAIN_BRANCH.to_string(),
                        head: None,
                    }],
                },
                commits: HashMap::new(),
            },
        );
        Ok(id)
    }

    fn do_submit_commit(
        &self,
        repository: RepositoryId,
        branch: &str,
        files: Vec<(String, FileBlob)>,
        message: &str,
    ) -> RemoteResult<CommitId> {
        let mut state = self.begin("submitCommit")?;
        let parent = state.repository(repository)?.head(branch)?;
        let id = state.allocate_commit()?;
        let snapshot = CommitSnapshot {
            id: id.clone(),
            tree: files.into_iter().collect(),
            parent,
            message: message.to_string(),
            author: self.principal.clone(),
            timestamp: Utc::now(),
        };

        let repo = state.repository_mut(repository)?;
        repo.branch_mut(branch)?.head = Some(id.clone());
        repo.commits.insert(id.clone(), snapshot);
        Ok(id)
    }

    fn do_create_branch(&self, repository: RepositoryId, source: &str, name: &str) -> RemoteResult<()> {
        let mut state = self.begin("createBranch")?;
        let repo = state.repository_mut(repository)?;
        let head = repo.head(source)?;
        if repo.info.branch(name).is_some() {
            return Err(RemoteError::rejected(format!("branch {name} already exists")));
        }
        repo.info.branches.push(BranchInfo {
            name: name.to_string(),
            head,
        });
        Ok(())
    }

    fn do_merge_branch(&self, repository: RepositoryId, source: &str, target: &str) -> RemoteResult<()> {
        let mut state = self.begin("mergeBranch")?;
        let repo = state.repository_mut(repository)?;
        let head = repo.head(source)?;
        repo.branch_mut(target)?.head = head;
        Ok(())
    }

    fn do_fork_repository(&self, repository: RepositoryId, name: &str) -> RemoteResult<RepositoryId> {
        let mut state = self.begin("forkRepository")?;
        if name.trim().is_empty() {
            return Err(RemoteError::rejected("repository name must not be empty"));
        }
        let mut fork = state.repository(repository)?.clone();
        let id = state.allocate_repository();
        fork.info.id = id;
        fork.info.name = name.to_string();
        fork.info.owner = self.principal.clone();
        fork.info.collaborators.clear();
        state.repositories.insert(id, fork);
        Ok(id)
    }

    fn do_add_collaborator(&self, repository: RepositoryId, principal: &str) -> RemoteResult<()> {
        let mut state = self.begin("addCollaborator")?;
        if principal.trim().is_empty() {
            return Err(RemoteError::rejected("collaborator principal must not be empty"));
        }
        let repo = state.repository_mut(repository)?;
        if !repo.info.collaborators.iter().any(|c| c == principal) {
            repo.info.collaborators.push(principal.to_string());
        }
        Ok(())
    }

    fn do_fetch_repository(&self, repository: RepositoryId) -> RemoteResult<RepositoryInfo> {
        let state = self.begin("fetchRepository")?;
        Ok(state.repository(repository)?.info.clone())
    }

    fn do_fetch_commit(&self, repository: RepositoryId, commit: &CommitId) -> RemoteResult<CommitSnapshot> {
        let state = self.begin("fetchCommit")?;
        state
            .repository(repository)?
            .commits
            .get(commit)
            .cloned()
            .ok_or_else(|| RemoteError::rejected(format!("commit {commit} not found")))
    }

    fn do_push_commit(&self, repository: RepositoryId, branch: &str, commit: &CommitId) -> RemoteResult<()> {
        let mut state = self.begin("pushCommit")?;
        let repo = state.repository_mut(repository)?;
        if !repo.commits.contains_key(commit) {
            return Err(RemoteError::rejected(format!("commit {commit} not found")));
        }
        repo.branch_mut(branch)?.head = Some(commit.clone());
        Ok(())
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteService for InMemoryRemote {
    fn principal(&self) -> String {
        self.principal.clone()
    }

    async fn create_repository(&self, name: &str, is_public: bool) -> RemoteResult<RepositoryId> {
        self.do_create_repository(name, is_public)
    }

    async fn submit_commit(
        &self,
        repository: RepositoryId,
        branch: &str,
        files: Vec<(String, FileBlob)>,
        message: &str,
    ) -> RemoteResult<CommitId> {
        self.do_submit_commit(repository, branch, files, message)
    }

    async fn create_branch(&self, repository: RepositoryId, source: &str, name: &str) -> RemoteResult<()> {
        self.do_create_branch(repository, source, name)
    }

    async fn merge_branch(&self, repository: RepositoryId, source: &str, target: &str) -> RemoteResult<()> {
        self.do_merge_branch(repository, source, target)
    }

    async fn fork_repository(&self, repository: RepositoryId, name: &str) -> RemoteResult<RepositoryId> {
        self.do_fork_repository(repository, name)
    }

    async fn add_collaborator(&self, repository: RepositoryId, principal: &str) -> RemoteResult<()> {
        self.do_add_collaborator(repository, principal)
    }

    async fn fetch_repository(&self, repository: RepositoryId) -> RemoteResult<RepositoryInfo> {
        self.do_fetch_repository(repository)
    }

    async fn fetch_commit(&self, repository: RepositoryId, commit: &CommitId) -> RemoteResult<CommitSnapshot> {
        self.do_fetch_commit(repository, commit)
    }

    async fn push_commit(&self, repository: RepositoryId, branch: &str, commit: &CommitId) -> RemoteResult<()> {
        self.do_push_commit(repository, branch, commit)
    }
}
