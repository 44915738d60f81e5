use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::git::cli::GitCommandError;

/// Exit code reported for failures that carry no actionable detail.
pub const GENERIC_EXIT_CODE: i32 = 200;

/// Failure taxonomy for the session initializer.
///
/// Each variant maps to a distinct process exit code via [`CloneError::exit_code`].
/// External orchestration reacts to the exit code alone, so the set is closed
/// and the codes are a stable contract.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("repository initialization failed: {message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("git server did not become available at {url} within {waited_secs} seconds")]
    RemoteUnavailable { url: String, waited_secs: u64 },

    #[error("autosave branch has an unexpected format: {message}")]
    UnexpectedAutosaveFormat { message: String },

    #[error("not enough disk space left to materialize the repository")]
    NoDiskSpace {
        #[source]
        source: Option<GitCommandError>,
    },

    #[error("branch '{branch}' could not be checked out")]
    BranchDoesNotExist {
        branch: String,
        #[source]
        source: Option<GitCommandError>,
    },

    #[error("submodule initialization failed: {message}")]
    SubmoduleFailure { message: String },

    #[error("cloud storage mount path '{}' would overwrite existing files", .path.display())]
    CloudStorageOverwritesExistingFiles { path: PathBuf },
}

impl CloneError {
    /// Process exit code surfaced for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Generic { .. } => GENERIC_EXIT_CODE,
            Self::RemoteUnavailable { .. } => 201,
            Self::UnexpectedAutosaveFormat { .. } => 202,
            Self::NoDiskSpace { .. } => 203,
            Self::BranchDoesNotExist { .. } => 204,
            Self::SubmoduleFailure { .. } => 205,
            Self::CloudStorageOverwritesExistingFiles { .. } => 206,
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
            source: None,
        }
    }

    pub fn generic_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn remote_unavailable(url: impl Into<String>, waited_secs: u64) -> Self {
        Self::RemoteUnavailable {
            url: url.into(),
            waited_secs,
        }
    }

    pub fn no_disk_space() -> Self {
        Self::NoDiskSpace { source: None }
    }

    pub fn no_disk_space_with_source(source: GitCommandError) -> Self {
        Self::NoDiskSpace {
            source: Some(source),
        }
    }

    pub fn branch_does_not_exist(branch: impl Into<String>, source: GitCommandError) -> Self {
        Self::BranchDoesNotExist {
            branch: branch.into(),
            source: Some(source),
        }
    }

    pub fn cloud_storage_overwrites(path: impl Into<PathBuf>) -> Self {
        Self::CloudStorageOverwritesExistingFiles { path: path.into() }
    }
}

impl From<GitCommandError> for CloneError {
    fn from(error: GitCommandError) -> Self {
        Self::Generic {
            message: "git command failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<std::io::Error> for CloneError {
    fn from(error: std::io::Error) -> Self {
        Self::Generic {
            message: "file system operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}
