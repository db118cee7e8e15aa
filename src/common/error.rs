use std::path::PathBuf;
use thiserror::Error;

/// Error type covering every failure the tool reports.
///
/// Expected conditions (missing config, unbound working copy, rejected
/// push) are ordinary variants, not panics; the binary maps them to a
/// non-zero exit status.
#[derive(Error, Debug)]
pub enum RepomgrError {
    /// Configuration file missing, malformed, or failing validation.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What went wrong while loading the configuration.
        message: String,
        /// Underlying parse or validation error, when present.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A git operation reported failure through libgit2.
    #[error("Git operation failed: {message}")]
    GitError {
        /// Operation context, e.g. "clone failed".
        message: String,
        /// The libgit2 error, when present.
        #[source]
        source: Option<git2::Error>,
    },

    /// Filesystem access failed outside of git itself.
    #[error("File system operation failed: {message}")]
    FileSystemError {
        /// What was being done when the failure occurred.
        message: String,
        /// Path involved, when known.
        path: Option<PathBuf>,
        /// Underlying io error, when present.
        #[source]
        source: Option<std::io::Error>,
    },

    /// An operation ran before the working copy was cloned or opened.
    #[error("No git repository found at {}: clone it first with --clone", path.display())]
    NotBound {
        /// The configured target directory that holds no working copy.
        path: PathBuf,
    },

    /// A named remote was required but does not exist.
    #[error("Remote '{name}' not found: push once or add it manually before pulling")]
    RemoteNotFound {
        /// The remote name that was looked up.
        name: String,
    },

    /// A field-level validation failure.
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Anything that does not fit the categories above.
    #[error("Internal error: {message}")]
    InternalError {
        /// Description of the unexpected failure.
        message: String,
        /// Underlying error, when present.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RepomgrError {
    /// Configuration error without an underlying cause.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    /// Configuration error wrapping its cause.
    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Git error without an underlying cause.
    pub fn git_error(message: impl Into<String>) -> Self {
        Self::GitError {
            message: message.into(),
            source: None,
        }
    }

    /// Git error wrapping the libgit2 cause.
    pub fn git_error_with_source(message: impl Into<String>, source: git2::Error) -> Self {
        Self::GitError {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Filesystem error without an underlying cause.
    pub fn filesystem_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Filesystem error wrapping the io cause.
    pub fn filesystem_error_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    /// The "clone first" condition for the given target directory.
    pub fn not_bound(path: impl Into<PathBuf>) -> Self {
        Self::NotBound { path: path.into() }
    }

    /// Missing-remote condition for the given remote name.
    pub fn remote_not_found(name: impl Into<String>) -> Self {
        Self::RemoteNotFound { name: name.into() }
    }

    /// Field-level validation failure.
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Internal error without an underlying cause.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }
}

impl From<git2::Error> for RepomgrError {
    fn from(error: git2::Error) -> Self {
        Self::git_error_with_source("git operation failed", error)
    }
}

impl From<std::io::Error> for RepomgrError {
    fn from(error: std::io::Error) -> Self {
        Self::filesystem_error_with_source("file system operation failed", None, error)
    }
}

impl From<serde_yaml::Error> for RepomgrError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_error_with_source("YAML parsing failed", error)
    }
}

impl From<crate::domain::value_objects::GitUrlError> for RepomgrError {
    fn from(error: crate::domain::value_objects::GitUrlError) -> Self {
        Self::validation_error("repository.url", error.to_string())
    }
}

impl From<crate::domain::value_objects::BranchNameError> for RepomgrError {
    fn from(error: crate::domain::value_objects::BranchNameError) -> Self {
        Self::validation_error("branch", error.to_string())
    }
}
