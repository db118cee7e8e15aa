use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    Cred, CredentialType, FetchOptions, IndexAddOption, Oid, PushOptions, RemoteCallbacks,
    Repository as Git2Repository, StatusOptions,
};
use tracing::{debug, info};

use crate::common::{RepomgrError, RepomgrResult};
use crate::domain::entities::config::{Credentials, GitIdentity};
use crate::domain::value_objects::BranchName;

use super::progress::{self, ClonePhase, ProgressEvent, ProgressSink};
use super::remote::RemoteManager;

/// Options for cloning a remote repository.
///
/// The progress sink carries its own lifetime: `&mut dyn FnMut` is
/// invariant, so tying it to the borrowed branch/credentials would
/// force callers to hand out a sink living as long as those borrows.
pub struct CloneOptions<'a, 'p> {
    /// Branch to clone and check out.
    pub branch: Option<&'a BranchName>,
    /// Credentials offered to the transport, matching the ones embedded
    /// in the URL.
    pub credentials: Option<&'a Credentials>,
    /// Progress event consumer, if any.
    pub progress: Option<ProgressSink<'p>>,
}

/// Snapshot of the working tree, grouped the way `git status` groups
/// entries.
#[derive(Debug, Clone, Default)]
pub struct WorkingTreeStatus {
    /// Currently checked-out branch, when HEAD points at one.
    pub current_branch: Option<String>,
    /// Paths staged in the index.
    pub staged: Vec<String>,
    /// Tracked paths modified in the working tree.
    pub modified: Vec<String>,
    /// Tracked paths deleted from the working tree.
    pub deleted: Vec<String>,
    /// Untracked paths.
    pub untracked: Vec<String>,
}

impl WorkingTreeStatus {
    /// Whether nothing is pending anywhere.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.untracked.is_empty()
    }
}

/// Wrapper around `git2::Repository` with the operations the session
/// needs. All calls are synchronous and blocking.
pub struct GitRepository {
    repo: Git2Repository,
    path: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open an existing working copy.
    ///
    /// Any open failure is reported as the "clone first" condition; the
    /// caller cannot distinguish a missing directory from a directory
    /// that is not a repository, and does not need to.
    pub fn open(path: &Path) -> RepomgrResult<Self> {
        let repo = Git2Repository::open(path).map_err(|_| RepomgrError::not_bound(path))?;
        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    /// Clone `url` into `target`, reporting progress events if a sink is
    /// provided.
    pub fn clone(url: &str, target: &Path, options: CloneOptions<'_, '_>) -> RepomgrResult<Self> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    RepomgrError::filesystem_error_with_source(
                        "failed to create clone parent directory",
                        Some(parent.to_path_buf()),
                        e,
                    )
                })?;
            }
        }

        let CloneOptions {
            branch,
            credentials,
            progress,
        } = options;
        let sink = progress.map(RefCell::new);

        let mut callbacks = remote_callbacks(credentials);
        if let Some(cell) = &sink {
            callbacks.transfer_progress(|stats| {
                (*cell.borrow_mut())(progress::transfer_event(&stats));
                true
            });
            callbacks.sideband_progress(|data| {
                for event in progress::parse_sideband_chunk(data) {
                    (*cell.borrow_mut())(event);
                }
                true
            });
        }

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let mut checkout = CheckoutBuilder::new();
        if let Some(cell) = &sink {
            checkout.progress(|_path, completed, total| {
                (*cell.borrow_mut())(ProgressEvent {
                    phase: ClonePhase::CheckingOut,
                    current: completed,
                    total,
                });
            });
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options).with_checkout(checkout);
        if let Some(branch) = branch {
            builder.branch(branch.as_str());
        }

        let repo = builder.clone(url, target).map_err(|e| {
            RepomgrError::git_error_with_source(
                format!("clone into {} failed", target.display()),
                e,
            )
        })?;
        info!(path = %target.display(), "repository cloned");

        Ok(Self {
            repo,
            path: target.to_path_buf(),
        })
    }

    /// Write the committer identity into the working copy's local config.
    pub fn configure_identity(&self, identity: &GitIdentity) -> RepomgrResult<()> {
        let mut config = self.repo.config()?;
        if let Some(name) = identity.name.as_deref() {
            config.set_str("user.name", name)?;
            info!(name, "configured git user name");
        }
        if let Some(email) = identity.email.as_deref() {
            config.set_str("user.email", email)?;
            info!(email, "configured git user email");
        }
        Ok(())
    }

    /// Stage every pending change, `git add -A` style: additions,
    /// modifications, and deletions.
    pub fn stage_all(&self) -> RepomgrResult<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// Whether anything is staged, modified, deleted, or untracked.
    pub fn has_changes(&self) -> RepomgrResult<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    /// Commit the index with `message`, handling the initial commit of a
    /// fresh repository (no parent).
    pub fn commit(&self, message: &str) -> RepomgrResult<Oid> {
        let signature = self.repo.signature().map_err(|e| {
            RepomgrError::git_error_with_source(
                "committer identity not configured (set git_user in the config)",
                e,
            )
        })?;

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<_> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| RepomgrError::git_error_with_source("commit failed", e))?;
        Ok(oid)
    }

    /// The currently checked-out branch.
    pub fn current_branch(&self) -> RepomgrResult<BranchName> {
        let head = self
            .repo
            .head()
            .map_err(|e| RepomgrError::git_error_with_source("failed to resolve HEAD", e))?;
        let name = head
            .shorthand()
            .ok_or_else(|| RepomgrError::git_error("HEAD is not on a branch"))?;
        Ok(BranchName::new(name)?)
    }

    /// Push `branch` to the named remote, creating the remote or
    /// rewriting its URL with `url` first.
    ///
    /// A per-ref rejection reported by the server fails the push with
    /// the server's summary even when the transport call itself
    /// succeeds.
    pub fn push(
        &self,
        remote_name: &str,
        url: &str,
        branch: &BranchName,
        credentials: Option<&Credentials>,
    ) -> RepomgrResult<()> {
        RemoteManager::new(&self.repo).ensure(remote_name, url)?;
        let mut remote = self.repo.find_remote(remote_name)?;

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        {
            let mut callbacks = remote_callbacks(credentials);
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            let refspec = format!("{}:{}", branch.local_ref(), branch.local_ref());
            remote
                .push(&[refspec.as_str()], Some(&mut push_options))
                .map_err(|e| {
                    RepomgrError::git_error_with_source(
                        format!("push to '{remote_name}/{branch}' failed"),
                        e,
                    )
                })?;
        }

        if let Some(summary) = rejection.into_inner() {
            return Err(RepomgrError::git_error(format!("push rejected: {summary}")));
        }
        Ok(())
    }

    /// Fetch the named remote using its configured refspecs.
    ///
    /// The remote must already exist; pull never creates one.
    pub fn fetch(&self, remote_name: &str, credentials: Option<&Credentials>) -> RepomgrResult<()> {
        RemoteManager::new(&self.repo).require(remote_name)?;
        let mut remote = self.repo.find_remote(remote_name)?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(credentials));

        remote
            .fetch(&[] as &[&str], Some(&mut fetch_options), None)
            .map_err(|e| {
                RepomgrError::git_error_with_source(
                    format!("fetch from '{remote_name}' failed"),
                    e,
                )
            })?;
        Ok(())
    }

    /// Advance the local branch to its remote-tracking counterpart.
    ///
    /// Only fast-forward moves are performed; diverged history is an
    /// error (merge commits are out of scope for this tool). When the
    /// moved branch is the checked-out one, the index and working tree
    /// are updated to the new commit as well.
    pub fn fast_forward(&self, remote_name: &str, branch: &BranchName) -> RepomgrResult<()> {
        let upstream_ref = branch.remote_ref(remote_name);
        let upstream = self.repo.find_reference(&upstream_ref).map_err(|_| {
            RepomgrError::git_error(format!(
                "branch '{branch}' not found on remote '{remote_name}'"
            ))
        })?;
        let upstream_commit = upstream.peel_to_commit()?;

        let local_ref_name = branch.local_ref();
        let local_commit = self
            .repo
            .find_reference(&local_ref_name)
            .map_err(|e| {
                RepomgrError::git_error_with_source(
                    format!("local branch '{branch}' not found"),
                    e,
                )
            })?
            .peel_to_commit()?;

        if local_commit.id() == upstream_commit.id() {
            debug!(branch = %branch, "already up to date");
            return Ok(());
        }

        let merge_base = self.repo.merge_base(local_commit.id(), upstream_commit.id())?;
        if merge_base != local_commit.id() {
            return Err(RepomgrError::git_error(format!(
                "cannot fast-forward '{branch}': local history has diverged from '{remote_name}'"
            )));
        }

        let mut local_ref = self.repo.find_reference(&local_ref_name)?;
        local_ref.set_target(upstream_commit.id(), "fast-forward")?;

        // A safe checkout would be a no-op here: the index still matches
        // the old commit. Force the tree to the new HEAD instead.
        if self.repo.head()?.name() == Some(local_ref_name.as_str()) {
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            self.repo.checkout_head(Some(&mut checkout))?;
        }

        info!(branch = %branch, "fast-forwarded");
        Ok(())
    }

    /// Snapshot the working tree status.
    pub fn status(&self) -> RepomgrResult<WorkingTreeStatus> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut options))?;

        let mut status = WorkingTreeStatus {
            current_branch: self
                .repo
                .head()
                .ok()
                .and_then(|head| head.shorthand().map(str::to_string)),
            ..Default::default()
        };

        for entry in statuses.iter() {
            let Some(path) = entry.path() else { continue };
            let flags = entry.status();
            if flags.is_index_new()
                || flags.is_index_modified()
                || flags.is_index_deleted()
                || flags.is_index_renamed()
                || flags.is_index_typechange()
            {
                status.staged.push(path.to_string());
            }
            if flags.is_wt_modified() {
                status.modified.push(path.to_string());
            }
            if flags.is_wt_deleted() {
                status.deleted.push(path.to_string());
            }
            if flags.is_wt_new() {
                status.untracked.push(path.to_string());
            }
        }

        Ok(status)
    }

    /// The working copy path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn remote_callbacks(credentials: Option<&Credentials>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed| {
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some((username, password)) = credentials.and_then(Credentials::pair) {
                return Cred::userpass_plaintext(username, password);
            }
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });
    callbacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo(dir: &Path) -> GitRepository {
        let mut options = git2::RepositoryInitOptions::new();
        options.initial_head("main");
        Git2Repository::init_opts(dir, &options).unwrap();
        let repo = GitRepository::open(dir).unwrap();
        repo.configure_identity(&GitIdentity {
            name: Some("Test User".to_string()),
            email: Some("test@example.com".to_string()),
        })
        .unwrap();
        repo
    }

    #[test]
    fn test_open_nonexistent_is_not_bound() {
        let temp_dir = TempDir::new().unwrap();
        let error = GitRepository::open(&temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(error, RepomgrError::NotBound { .. }));
    }

    #[test]
    fn test_open_plain_directory_is_not_bound() {
        let temp_dir = TempDir::new().unwrap();
        let error = GitRepository::open(temp_dir.path()).unwrap_err();
        assert!(matches!(error, RepomgrError::NotBound { .. }));
    }

    #[test]
    fn test_stage_commit_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let repo = init_repo(temp_dir.path());

        fs::write(temp_dir.path().join("hello.txt"), "hi\n").unwrap();
        assert!(repo.has_changes().unwrap());

        repo.stage_all().unwrap();
        let oid = repo.commit("initial commit").unwrap();
        assert_eq!(oid.to_string().len(), 40);
        assert!(!repo.has_changes().unwrap());

        assert_eq!(repo.current_branch().unwrap().as_str(), "main");
    }

    #[test]
    fn test_stage_all_picks_up_deletions() {
        let temp_dir = TempDir::new().unwrap();
        let repo = init_repo(temp_dir.path());

        fs::write(temp_dir.path().join("a.txt"), "a\n").unwrap();
        repo.stage_all().unwrap();
        repo.commit("add a").unwrap();

        fs::remove_file(temp_dir.path().join("a.txt")).unwrap();
        assert!(repo.has_changes().unwrap());
        repo.stage_all().unwrap();
        repo.commit("remove a").unwrap();
        assert!(!repo.has_changes().unwrap());
    }

    #[test]
    fn test_status_groups_entries() {
        let temp_dir = TempDir::new().unwrap();
        let repo = init_repo(temp_dir.path());

        fs::write(temp_dir.path().join("tracked.txt"), "v1\n").unwrap();
        repo.stage_all().unwrap();
        repo.commit("initial commit").unwrap();

        fs::write(temp_dir.path().join("tracked.txt"), "v2\n").unwrap();
        fs::write(temp_dir.path().join("new.txt"), "new\n").unwrap();

        let status = repo.status().unwrap();
        assert_eq!(status.current_branch.as_deref(), Some("main"));
        assert_eq!(status.modified, vec!["tracked.txt".to_string()]);
        assert_eq!(status.untracked, vec!["new.txt".to_string()]);
        assert!(!status.is_clean());
    }

    #[test]
    fn test_fetch_without_remote_fails() {
        let temp_dir = TempDir::new().unwrap();
        let repo = init_repo(temp_dir.path());

        let error = repo.fetch("origin", None).unwrap_err();
        assert!(matches!(error, RepomgrError::RemoteNotFound { .. }));
    }
}
