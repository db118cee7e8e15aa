//! Shared helpers for integration tests.
//!
//! Upstream repositories are bare and seeded through git2 object
//! building, so tests need no network and no git binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Oid, Repository};

use repomgr::domain::entities::{
    CommitSettings, GitIdentity, ManagerConfig, RepositorySettings,
};

/// Create a bare upstream repository with one commit on `main`.
pub fn seeded_upstream(dir: &Path) -> PathBuf {
    let path = dir.join("upstream.git");
    let mut options = git2::RepositoryInitOptions::new();
    options.bare(true).initial_head("main");
    let repo = Repository::init_opts(&path, &options).unwrap();
    commit_file(&repo, "README.md", "# upstream\n", "initial commit");
    path
}

/// Add or replace one file on `main` with a new commit, without
/// touching any working tree.
pub fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> Oid {
    let signature = git2::Signature::now("Upstream", "upstream@example.com").unwrap();
    let blob = repo.blob(contents.as_bytes()).unwrap();

    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let base_tree = parent.as_ref().map(|commit| commit.tree().unwrap());

    let mut builder = repo.treebuilder(base_tree.as_ref()).unwrap();
    builder.insert(name, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(
        Some("refs/heads/main"),
        &signature,
        &signature,
        message,
        &tree,
        &parents,
    )
    .unwrap()
}

/// Tip commit id of a branch in the given repository.
pub fn branch_tip(path: &Path, branch: &str) -> Option<Oid> {
    let repo = Repository::open(path).unwrap();
    let tip = repo
        .find_reference(&format!("refs/heads/{branch}"))
        .ok()
        .map(|reference| reference.peel_to_commit().unwrap().id());
    tip
}

/// Tip commit id of `main` in the given repository.
pub fn main_tip(path: &Path) -> Oid {
    branch_tip(path, "main").unwrap()
}

/// Configuration pointing a session at a local upstream path.
pub fn manager_config(upstream: &Path, target: &Path) -> ManagerConfig {
    ManagerConfig {
        repository: RepositorySettings {
            url: upstream.display().to_string(),
            target_directory: target.to_path_buf(),
            branch: "main".to_string(),
        },
        credentials: None,
        git_user: Some(GitIdentity {
            name: Some("Tester".to_string()),
            email: Some("tester@example.com".to_string()),
        }),
        commit_settings: CommitSettings::default(),
    }
}

/// Write a config.yaml for the CLI pointing at a local upstream path.
pub fn write_config_yaml(path: &Path, upstream: &Path, target: &Path) {
    let contents = format!(
        r#"repository:
  url: "{}"
  target_directory: "{}"
  branch: "main"
git_user:
  name: "Tester"
  email: "tester@example.com"
"#,
        upstream.display(),
        target.display()
    );
    std::fs::write(path, contents).unwrap();
}
