//! Value objects with their own validation rules.

pub mod branch_name;
pub mod git_url;

pub use branch_name::{BranchName, BranchNameError};
pub use git_url::{GitUrl, GitUrlError, UrlScheme};
