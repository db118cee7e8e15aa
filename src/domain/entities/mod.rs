//! Domain entities.

pub mod config;

pub use config::{CommitSettings, Credentials, GitIdentity, ManagerConfig, RepositorySettings};
