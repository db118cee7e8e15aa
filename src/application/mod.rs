//! Application layer: the repository session and its operations.

pub mod session;

pub use session::{CommitOutcome, RepoSession, DEFAULT_REMOTE};
