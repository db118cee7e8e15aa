//! repomgr - configuration-driven git repository automation.
//!
//! A small tool that clones, commits, pushes, pulls, and reports status
//! for a single repository described by a YAML configuration file.
//! Credentials from the configuration are injected into HTTP(S) URLs at
//! the moment they are needed and are never persisted or logged.

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{CommitOutcome, RepoSession, DEFAULT_REMOTE};
pub use common::{RepomgrError, RepomgrResult};
pub use domain::entities::ManagerConfig;
pub use infrastructure::filesystem::ConfigStore;
pub use infrastructure::git::WorkingTreeStatus;
