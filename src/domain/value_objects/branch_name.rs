use std::fmt;

use thiserror::Error;

/// Branch name related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BranchNameError {
    /// Empty or whitespace-only name.
    #[error("Branch name must not be empty")]
    Empty,

    /// Name violating git reference rules.
    #[error("Invalid branch name: {0}")]
    Invalid(String),
}

/// A validated local branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchName(String);

impl BranchName {
    /// Validate and wrap a branch name.
    ///
    /// Enforces the subset of git's ref rules this tool can run into:
    /// no whitespace, no "..", no leading '-' or '/', no ".lock" suffix.
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BranchNameError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(BranchNameError::Invalid(format!(
                "'{trimmed}' contains whitespace"
            )));
        }
        if trimmed.contains("..") {
            return Err(BranchNameError::Invalid(format!(
                "'{trimmed}' contains '..'"
            )));
        }
        if trimmed.starts_with('-') || trimmed.starts_with('/') || trimmed.ends_with('/') {
            return Err(BranchNameError::Invalid(format!(
                "'{trimmed}' has a leading or trailing separator"
            )));
        }
        if trimmed.ends_with(".lock") {
            return Err(BranchNameError::Invalid(format!(
                "'{trimmed}' ends with '.lock'"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The local ref name, `refs/heads/{name}`.
    pub fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// The remote-tracking ref name, `refs/remotes/{remote}/{name}`.
    pub fn remote_ref(&self, remote: &str) -> String {
        format!("refs/remotes/{}/{}", remote, self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(BranchName::new("main").is_ok());
        assert!(BranchName::new("feature/login").is_ok());
        assert!(BranchName::new("release-1.2").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(BranchName::new(""), Err(BranchNameError::Empty));
        assert_eq!(BranchName::new("  "), Err(BranchNameError::Empty));
        assert!(BranchName::new("has space").is_err());
        assert!(BranchName::new("a..b").is_err());
        assert!(BranchName::new("-leading").is_err());
        assert!(BranchName::new("/leading").is_err());
        assert!(BranchName::new("trailing/").is_err());
        assert!(BranchName::new("name.lock").is_err());
    }

    #[test]
    fn test_ref_names() {
        let branch = BranchName::new("main").unwrap();
        assert_eq!(branch.local_ref(), "refs/heads/main");
        assert_eq!(branch.remote_ref("origin"), "refs/remotes/origin/main");
    }
}
