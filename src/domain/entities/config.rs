use std::path::PathBuf;

use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Fully resolved tool configuration.
///
/// Loaded once at startup and never mutated afterwards; every default is
/// applied during deserialization so call sites read plain values.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManagerConfig {
    /// The repository this tool operates on.
    #[validate(nested)]
    pub repository: RepositorySettings,

    /// Optional credentials embedded into HTTP(S) URLs.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Optional committer identity written to the working copy config.
    #[serde(default)]
    pub git_user: Option<GitIdentity>,

    /// Commit behavior flags.
    #[serde(default)]
    pub commit_settings: CommitSettings,
}

/// Location of the remote repository and the local working copy.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RepositorySettings {
    /// Remote repository URL (HTTPS, HTTP, or SSH).
    #[validate(length(min = 1, message = "must not be empty"))]
    pub url: String,

    /// Directory holding (or receiving) the local working copy.
    #[validate(custom(function = "validate_target_directory"))]
    pub target_directory: PathBuf,

    /// Branch to clone and track.
    #[serde(default = "default_branch")]
    pub branch: String,
}

/// Static username/password pair for HTTP(S) remotes.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Username, if configured.
    #[serde(default)]
    pub username: Option<String>,

    /// Password or access token, if configured.
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// The (username, password) pair when both are present and non-empty.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some((username, password))
            }
            _ => None,
        }
    }
}

/// Committer name and email applied to the working copy after binding.
#[derive(Debug, Clone, Deserialize)]
pub struct GitIdentity {
    /// `user.name`, if configured.
    #[serde(default)]
    pub name: Option<String>,

    /// `user.email`, if configured.
    #[serde(default)]
    pub email: Option<String>,
}

/// Commit behavior flags.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSettings {
    /// Stage every pending change before committing.
    #[serde(default = "default_true")]
    pub auto_add_all: bool,
}

impl Default for CommitSettings {
    fn default() -> Self {
        Self { auto_add_all: true }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

fn validate_target_directory(path: &PathBuf) -> Result<(), ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("target_directory_empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(yaml: &str) -> Result<ManagerConfig, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(
            r#"
repository:
  url: "https://example.com/repo.git"
  target_directory: "/tmp/r"
  branch: "develop"
credentials:
  username: "alice"
  password: "s3cret"
git_user:
  name: "Alice"
  email: "alice@example.com"
commit_settings:
  auto_add_all: false
"#,
        )
        .unwrap();

        assert_eq!(config.repository.url, "https://example.com/repo.git");
        assert_eq!(config.repository.branch, "develop");
        assert!(!config.commit_settings.auto_add_all);
        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.pair(), Some(("alice", "s3cret")));
        assert_eq!(config.git_user.unwrap().name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_minimal_config_applies_defaults() {
        let config = parse(
            r#"
repository:
  url: "git@github.com:owner/repo.git"
  target_directory: "/tmp/r"
"#,
        )
        .unwrap();

        assert_eq!(config.repository.branch, "main");
        assert!(config.commit_settings.auto_add_all);
        assert!(config.credentials.is_none());
        assert!(config.git_user.is_none());
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let result = parse(
            r#"
repository:
  target_directory: "/tmp/r"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_target_directory_is_rejected() {
        let result = parse(
            r#"
repository:
  url: "https://example.com/repo.git"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_url_fails_validation() {
        let config = parse(
            r#"
repository:
  url: ""
  target_directory: "/tmp/r"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_credentials_yield_no_pair() {
        let credentials = Credentials {
            username: Some("alice".to_string()),
            password: None,
        };
        assert_eq!(credentials.pair(), None);

        let credentials = Credentials {
            username: Some("alice".to_string()),
            password: Some(String::new()),
        };
        assert_eq!(credentials.pair(), None);
    }
}
