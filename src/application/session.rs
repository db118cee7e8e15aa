use std::fs;

use tracing::info;

use crate::common::{RepomgrError, RepomgrResult};
use crate::domain::entities::config::ManagerConfig;
use crate::domain::value_objects::{BranchName, GitUrl};
use crate::infrastructure::git::{CloneOptions, GitRepository, ProgressSink, WorkingTreeStatus};

/// Remote name used for push and pull.
pub const DEFAULT_REMOTE: &str = "origin";

/// What a commit request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created; `id` is the abbreviated commit id.
    Created {
        /// Abbreviated (7 character) commit id.
        id: String,
    },
    /// The working tree was clean; nothing was committed.
    NoChanges,
}

/// A session against the single configured repository.
///
/// The session starts unbound; every operation binds (opens the working
/// copy) on demand, and `clone` creates the working copy when it does
/// not exist yet. The authenticated URL is derived from the base URL and
/// credentials each time it is needed and is never stored or logged.
pub struct RepoSession {
    config: ManagerConfig,
    url: GitUrl,
    branch: BranchName,
    repo: Option<GitRepository>,
}

impl RepoSession {
    /// Build a session from a validated configuration.
    pub fn new(config: ManagerConfig) -> RepomgrResult<Self> {
        let url = GitUrl::try_from(config.repository.url.as_str())?;
        let branch = BranchName::new(&config.repository.branch)?;
        Ok(Self {
            config,
            url,
            branch,
            repo: None,
        })
    }

    /// Whether the session holds an open working copy.
    pub fn is_bound(&self) -> bool {
        self.repo.is_some()
    }

    /// The configured branch.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Clone the configured repository into the target directory.
    ///
    /// An existing working copy is opened instead of re-cloned; a
    /// directory that is not a working copy is an error unless `force`
    /// is set, in which case it is removed first.
    pub fn clone(&mut self, force: bool, progress: Option<ProgressSink<'_>>) -> RepomgrResult<()> {
        let target = self.config.repository.target_directory.clone();

        if target.exists() {
            if force {
                info!(path = %target.display(), "removing existing directory before clone");
                fs::remove_dir_all(&target).map_err(|e| {
                    RepomgrError::filesystem_error_with_source(
                        "failed to remove existing clone target",
                        Some(target.clone()),
                        e,
                    )
                })?;
            } else if GitRepository::open(&target).is_ok() {
                info!(path = %target.display(), "repository already exists, opening it");
                return self.bind();
            } else {
                return Err(RepomgrError::git_error(format!(
                    "{} exists but is not a git repository: re-run with --force-clone to replace it",
                    target.display()
                )));
            }
        }

        // Log the base URL only; the authenticated one carries secrets.
        info!(url = %self.url, branch = %self.branch, "cloning repository");
        let authenticated = self.url.authenticated(self.config.credentials.as_ref());
        let repo = GitRepository::clone(
            &authenticated,
            &target,
            CloneOptions {
                branch: Some(&self.branch),
                credentials: self.config.credentials.as_ref(),
                progress,
            },
        )?;
        self.repo = Some(repo);
        self.apply_identity()
    }

    /// Open the working copy at the target directory if not already open.
    pub fn bind(&mut self) -> RepomgrResult<()> {
        if self.repo.is_some() {
            return Ok(());
        }
        let repo = GitRepository::open(&self.config.repository.target_directory)?;
        self.repo = Some(repo);
        self.apply_identity()
    }

    /// Stage and commit pending changes.
    ///
    /// `add_all` overrides the configured `auto_add_all` default when
    /// given.
    pub fn commit(&mut self, message: &str, add_all: Option<bool>) -> RepomgrResult<CommitOutcome> {
        self.bind()?;
        let repo = self.bound()?;

        if add_all.unwrap_or(self.config.commit_settings.auto_add_all) {
            repo.stage_all()?;
        }

        if !repo.has_changes()? {
            info!("nothing to commit, working tree clean");
            return Ok(CommitOutcome::NoChanges);
        }

        let oid = repo.commit(message)?;
        let id: String = oid.to_string().chars().take(7).collect();
        info!(commit = %id, "commit created");
        Ok(CommitOutcome::Created { id })
    }

    /// Push a branch to a remote.
    ///
    /// Defaults to [`DEFAULT_REMOTE`] and the working copy's currently
    /// checked-out branch. The remote URL is rewritten on every push so
    /// rotated credentials take effect immediately.
    pub fn push(&mut self, remote: Option<&str>, branch: Option<&BranchName>) -> RepomgrResult<()> {
        self.bind()?;
        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        let branch = self.resolve_branch(branch)?;
        let authenticated = self.url.authenticated(self.config.credentials.as_ref());
        let repo = self.bound()?;
        repo.push(
            remote,
            &authenticated,
            &branch,
            self.config.credentials.as_ref(),
        )?;
        info!(branch = %branch, remote, "pushed");
        Ok(())
    }

    /// Fetch a remote and fast-forward a branch.
    ///
    /// Defaults to [`DEFAULT_REMOTE`] and the working copy's currently
    /// checked-out branch. Fails when the remote does not exist; pull
    /// never creates one.
    pub fn pull(&mut self, remote: Option<&str>, branch: Option<&BranchName>) -> RepomgrResult<()> {
        self.bind()?;
        let remote = remote.unwrap_or(DEFAULT_REMOTE);
        let repo = self.bound()?;
        repo.fetch(remote, self.config.credentials.as_ref())?;
        let branch = self.resolve_branch(branch)?;
        repo.fast_forward(remote, &branch)?;
        info!(branch = %branch, remote, "pulled");
        Ok(())
    }

    /// Snapshot the working tree status.
    pub fn status(&mut self) -> RepomgrResult<WorkingTreeStatus> {
        self.bind()?;
        self.bound()?.status()
    }

    fn resolve_branch(&self, explicit: Option<&BranchName>) -> RepomgrResult<BranchName> {
        match explicit {
            Some(branch) => Ok(branch.clone()),
            None => self.bound()?.current_branch(),
        }
    }

    fn bound(&self) -> RepomgrResult<&GitRepository> {
        self.repo.as_ref().ok_or_else(|| {
            RepomgrError::not_bound(self.config.repository.target_directory.clone())
        })
    }

    fn apply_identity(&self) -> RepomgrResult<()> {
        if let Some(identity) = &self.config.git_user {
            self.bound()?.configure_identity(identity)?;
        }
        Ok(())
    }
}
