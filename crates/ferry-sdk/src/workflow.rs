//! Working-copy workflows.
//!
//! Each workflow loads the descriptor, staging index and ignore rules it
//! needs, talks to the remote through a [`RepositorySession`], and persists
//! local changes only after the remote call has succeeded. Nothing is cached
//! between calls.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ferry_index::{IgnoreFilter, IndexLock, SkippedEntry, StagingIndex, StagingOutcome, IGNORE_FILE_NAME};
use ferry_sync::{HttpRemote, PushMode, RepositorySession};
use ferry_tree::TreeBuilder;
use ferry_types::{normalize_relative, RepositoryId, MAIN_BRANCH};
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, CONFIG_FILE_NAME, ENV_REMOTE_URL};
use crate::descriptor::{state_of, WorkingCopyDescriptor, WorkingCopyState, DESCRIPTOR_FILE_NAME};
use crate::error::{SdkError, SdkResult};
use crate::outcome::{AddOutcome, CloneOutcome, CommitOutcome, InitOutcome, PushOutcome, StatusReport};

/// Written to `.ferryignore` by `init` when the file does not exist yet.
pub const SEED_IGNORE_RULES: &str = "\
# Ferry ignore rules: one gitignore-style pattern per line, `!` re-includes.
# Version-control metadata, node_modules/ and OS artifacts are always ignored.
*.swp
*~
";

/// A directory under version control, bound to a staging index and
/// (optionally) a remote session.
pub struct WorkingCopy {
    root: PathBuf,
    index_path: PathBuf,
    session: Option<RepositorySession>,
}

impl WorkingCopy {
    pub fn new(
        root: impl Into<PathBuf>,
        index_path: impl Into<PathBuf>,
        session: RepositorySession,
    ) -> Self {
        Self {
            root: root.into(),
            index_path: index_path.into(),
            session: Some(session),
        }
    }

    /// A working copy with no remote; only local workflows succeed.
    pub fn offline(root: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_path: index_path.into(),
            session: None,
        }
    }

    /// Bind `root` using `config`. Connects an [`HttpRemote`] when a remote
    /// URL is configured, which creates this invocation's session identity.
    pub fn open(root: impl Into<PathBuf>, config: &ClientConfig) -> SdkResult<Self> {
        let root = root.into();
        match config.remote_url.as_deref() {
            Some(url) => {
                let remote = HttpRemote::connect(url, config.ca_cert.as_deref())?;
                Ok(Self::new(root, &config.index_path, RepositorySession::new(Arc::new(remote))))
            }
            None => {
                debug!("no remote configured; working copy opened offline");
                Ok(Self::offline(root, &config.index_path))
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    fn session(&self) -> SdkResult<&RepositorySession> {
        self.session.as_ref().ok_or_else(|| {
            SdkError::Config(format!(
                "no remote configured; pass --remote, set {ENV_REMOTE_URL}, or add remote_url to {CONFIG_FILE_NAME}"
            ))
        })
    }

    pub fn descriptor(&self) -> SdkResult<Option<WorkingCopyDescriptor>> {
        WorkingCopyDescriptor::load(&self.root)
    }

    pub fn state(&self) -> SdkResult<WorkingCopyState> {
        Ok(state_of(self.descriptor()?.as_ref()))
    }

    fn require_descriptor(&self) -> SdkResult<WorkingCopyDescriptor> {
        self.descriptor()?.ok_or_else(|| {
            SdkError::State(format!(
                "{} is not a ferry working copy (no {DESCRIPTOR_FILE_NAME}); run `ferry init` first",
                self.root.display()
            ))
        })
    }

    /// Create the remote repository and bind this directory to it.
    pub async fn init(&self, name: &str, is_public: bool) -> SdkResult<InitOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SdkError::Usage("a repository name is required".to_string()));
        }
        let session = self.session()?;
        if let Some(existing) = self.descriptor()? {
            return Err(SdkError::State(format!(
                "already a ferry working copy (repository {})",
                existing.repository_id
            )));
        }
        if !self.root.is_dir() {
            return Err(SdkError::filesystem(&self.root, "not a directory"));
        }

        let repository = session.create_repository(name, is_public).await?;
        info!(%repository, name, is_public, "repository created");

        WorkingCopyDescriptor::new(repository)
            .save(&self.root)
            .inspect_err(|err| {
                error!(%repository, error = %err, "repository created remotely but the descriptor was not written");
            })?;

        Ok(InitOutcome {
            repository,
            name: name.to_string(),
            is_public,
            seeded_ignore_file: self.seed_ignore_file(),
        })
    }

    fn seed_ignore_file(&self) -> bool {
        let path = self.root.join(IGNORE_FILE_NAME);
        if path.exists() {
            return false;
        }
        match fs::write(&path, SEED_IGNORE_RULES) {
            Ok(()) => true,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "could not seed ignore file");
                false
            }
        }
    }

    /// Stage files. `"."` stages every included file; any other pattern
    /// stages included files whose relative path contains it.
    pub fn add<S: AsRef<str>>(&self, patterns: &[S]) -> SdkResult<AddOutcome> {
        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| normalize_pattern(p.as_ref()))
            .collect();
        if patterns.is_empty() {
            return Err(SdkError::Usage(
                "nothing specified, nothing added (try `ferry add .`)".to_string(),
            ));
        }
        if patterns.iter().any(String::is_empty) {
            return Err(SdkError::Usage("empty pattern".to_string()));
        }

        let _lock = IndexLock::acquire(&self.index_path)?;
        let mut index = StagingIndex::load(&self.index_path)?;
        let filter = IgnoreFilter::load(&self.root)?;

        let mut staged = StagingOutcome::new();
        let mut unmatched_patterns = Vec::new();
        for pattern in &patterns {
            let outcome = if pattern == "." {
                index.add_all(&self.root, &filter)?
            } else {
                let needle = pattern.strip_prefix("./").unwrap_or(pattern.as_str());
                index.add_matching(&self.root, &filter, needle)?
            };
            if outcome.matched() == 0 {
                warn!(pattern = %pattern, "pattern matched no files");
                unmatched_patterns.push(pattern.clone());
            }
            staged.merge(outcome);
        }

        if staged.changed() {
            index.save()?;
        }

        let added: BTreeSet<String> = staged.added.iter().cloned().collect();
        let mut seen = BTreeSet::new();
        let already_staged = staged
            .already_staged
            .into_iter()
            .filter(|p| !added.contains(p) && seen.insert(p.clone()))
            .collect();
        let mut seen = BTreeSet::new();
        let skipped: Vec<SkippedEntry> = staged
            .skipped
            .into_iter()
            .filter(|s| seen.insert(s.path.clone()))
            .collect();

        info!(added = added.len(), staged = index.len(), "add complete");
        Ok(AddOutcome {
            added: staged.added,
            already_staged,
            unmatched_patterns,
            skipped,
            staged_total: index.len(),
        })
    }

    /// Submit the staged files as a new commit on `main`.
    ///
    /// Descriptor and index are only written after the remote accepted the
    /// commit; any failure before that leaves both untouched.
    pub async fn commit(&self, message: &str) -> SdkResult<CommitOutcome> {
        if message.trim().is_empty() {
            return Err(SdkError::Usage("a commit message is required".to_string()));
        }
        let session = self.session()?;
        let mut descriptor = self.require_descriptor()?;

        let _lock = IndexLock::acquire(&self.index_path)?;
        let mut index = StagingIndex::load(&self.index_path)?;
        if index.is_empty() {
            return Err(SdkError::Usage(
                "nothing staged to commit (use `ferry add`)".to_string(),
            ));
        }

        let build = TreeBuilder::new(&self.root).build(&index);
        if !build.has_content() {
            return Err(SdkError::filesystem(
                &self.root,
                format!("none of the {} staged files could be read", index.len()),
            ));
        }
        let tree_digest = build.tree.digest();
        let files: Vec<String> = build.tree.iter().map(|(path, _)| path.to_string()).collect();

        let commit = session
            .submit_commit(
                descriptor.repository_id,
                MAIN_BRANCH,
                build.tree.into_entries(),
                message,
            )
            .await?;
        info!(%commit, files = files.len(), digest = %tree_digest.short_hex(), "commit accepted");

        descriptor.last_commit_id = Some(commit.clone());
        descriptor.save(&self.root).inspect_err(|err| {
            error!(%commit, error = %err, "commit accepted remotely but the descriptor was not updated");
        })?;
        index.clear();
        index.save().map_err(|err| {
            error!(%commit, error = %err, "commit recorded but the staging index was not cleared");
            SdkError::from(err)
        })?;

        Ok(CommitOutcome {
            commit,
            files,
            skipped: build.skipped,
            tree_digest,
        })
    }

    /// Publish the last local commit to `main`.
    ///
    /// With [`PushMode::Replay`] the commit's tree and message are submitted
    /// again, so every push creates a new remote commit and the descriptor
    /// keeps pointing at the original.
    pub async fn push(&self, mode: PushMode) -> SdkResult<PushOutcome> {
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        let repository = descriptor.repository_id;
        let source = descriptor.last_commit_id.ok_or_else(|| {
            SdkError::State("nothing to push: no commit recorded yet (run `ferry commit`)".to_string())
        })?;
        debug!(%mode, %source, "pushing");

        let pushed = match mode {
            PushMode::Replay => {
                let snapshot = session.fetch_commit(repository, &source).await?;
                let pushed = session
                    .submit_commit(repository, MAIN_BRANCH, snapshot.tree_entries(), &snapshot.message)
                    .await?;
                info!(%source, %pushed, "commit replayed onto remote");
                pushed
            }
            PushMode::Reference => {
                session.push_commit(repository, MAIN_BRANCH, &source).await?;
                info!(%source, "remote branch moved to commit");
                source.clone()
            }
        };

        Ok(PushOutcome { mode, source, pushed })
    }

    /// Write the head of the remote `main` branch into the working copy.
    pub async fn clone_repository(&self) -> SdkResult<CloneOutcome> {
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        let repository = descriptor.repository_id;

        let info = session.fetch_repository(repository).await?;
        let branch = info.branch(MAIN_BRANCH).ok_or_else(|| {
            SdkError::State(format!("repository {repository} has no {MAIN_BRANCH} branch"))
        })?;
        let head = branch.head.clone().ok_or_else(|| {
            SdkError::State(format!("branch {MAIN_BRANCH} of repository {repository} has no commits"))
        })?;
        let snapshot = session.fetch_commit(repository, &head).await?;

        let mut written = Vec::new();
        let mut skipped = Vec::new();
        for (path, blob) in &snapshot.tree {
            let Some(relative) = normalize_relative(path).filter(|p| p != DESCRIPTOR_FILE_NAME) else {
                warn!(path = %path, "refusing to write unsafe path");
                skipped.push(SkippedEntry::new(path.clone(), "unsafe path"));
                continue;
            };
            match write_file(&self.root.join(&relative), &blob.content) {
                Ok(()) => written.push(relative),
                Err(err) => {
                    warn!(path = %relative, error = %err, "could not write file");
                    skipped.push(SkippedEntry::new(relative, err.to_string()));
                }
            }
        }

        info!(commit = %head, files = written.len(), "working copy materialized");
        Ok(CloneOutcome {
            commit: head,
            written,
            skipped,
        })
    }

    /// Remote metadata plus the current staging index. Changes nothing.
    pub async fn status(&self) -> SdkResult<StatusReport> {
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        let repository = session.fetch_repository(descriptor.repository_id).await?;
        let index = StagingIndex::load(&self.index_path)?;

        Ok(StatusReport {
            state: descriptor.state(),
            repository,
            last_commit: descriptor.last_commit_id,
            staged: index.paths().map(str::to_string).collect(),
            index_path: self.index_path.clone(),
        })
    }

    pub async fn create_branch(&self, source: &str, name: &str) -> SdkResult<()> {
        require_arg(name, "a branch name is required")?;
        require_arg(source, "a source branch is required")?;
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        session.create_branch(descriptor.repository_id, source, name).await?;
        info!(source, name, "branch created");
        Ok(())
    }

    pub async fn merge_branch(&self, source: &str, target: &str) -> SdkResult<()> {
        require_arg(source, "a source branch is required")?;
        require_arg(target, "a target branch is required")?;
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        session.merge_branch(descriptor.repository_id, source, target).await?;
        info!(source, target, "branch merged");
        Ok(())
    }

    /// Fork the bound repository. The descriptor keeps pointing at the
    /// original.
    pub async fn fork(&self, name: &str) -> SdkResult<RepositoryId> {
        require_arg(name, "a name for the fork is required")?;
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        let fork = session.fork_repository(descriptor.repository_id, name.trim()).await?;
        info!(original = %descriptor.repository_id, %fork, "repository forked");
        Ok(fork)
    }

    pub async fn add_collaborator(&self, principal: &str) -> SdkResult<()> {
        require_arg(principal, "a collaborator principal is required")?;
        let session = self.session()?;
        let descriptor = self.require_descriptor()?;
        session
            .add_collaborator(descriptor.repository_id, principal.trim())
            .await?;
        info!(principal, "collaborator added");
        Ok(())
    }
}

fn normalize_pattern(pattern: &str) -> String {
    let pattern = pattern.trim();
    if cfg!(windows) {
        pattern.replace('\\', "/")
    } else {
        pattern.to_string()
    }
}

fn require_arg(value: &str, message: &str) -> SdkResult<()> {
    if value.trim().is_empty() {
        return Err(SdkError::Usage(message.to_string()));
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
