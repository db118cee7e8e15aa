//! git2 backed repository access.

pub mod progress;
pub mod remote;
pub mod repository;

pub use progress::{ClonePhase, ProgressEvent, ProgressSink};
pub use remote::RemoteManager;
pub use repository::{CloneOptions, GitRepository, WorkingTreeStatus};
