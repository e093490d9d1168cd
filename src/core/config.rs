//! core::config
//!
//! Explicit engine configuration.
//!
//! # Design
//!
//! The engine never reads process environment or any other ambient
//! state. Everything it needs to address a repository is carried by
//! [`RepoTarget`], validated once at construction and passed in
//! explicitly. The CLI layer is the only place environment variables
//! are consulted, and only as fallbacks for missing flags.
//!
//! # File Config
//!
//! An optional `quill.toml` can pre-fill target fields:
//!
//! ```toml
//! owner = "octocat"
//! repo = "hello-world"
//! branch = "main"
//! root_dir = "/work/repo"
//! ```
//!
//! Values are merged with CLI flags (flags win) before validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{BranchName, TypeError};

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("failed to read config file {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl From<TypeError> for ConfigError {
    fn from(err: TypeError) -> Self {
        ConfigError::InvalidValue(err.to_string())
    }
}

/// The repository a mutation targets.
///
/// All fields are validated at construction; an instance always names
/// a concrete `owner/repo`, a branch, and the local directory file
/// content is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch mutations apply to.
    pub branch: BranchName,
    /// Local directory repo-relative paths resolve against.
    pub root_dir: PathBuf,
}

impl RepoTarget {
    /// Create a validated target.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if owner or repo is empty, the
    /// branch name is invalid, or the root directory is empty.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl AsRef<str>,
        root_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let owner = owner.into();
        let repo = repo.into();
        let root_dir = root_dir.into();

        if owner.is_empty() {
            return Err(ConfigError::InvalidValue("owner cannot be empty".into()));
        }
        if repo.is_empty() {
            return Err(ConfigError::InvalidValue(
                "repository name cannot be empty".into(),
            ));
        }
        if root_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "root directory cannot be empty".into(),
            ));
        }
        let branch = BranchName::new(branch.as_ref())?;

        Ok(Self {
            owner,
            repo,
            branch,
            root_dir,
        })
    }

    /// The `owner/repo` slug for display.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Optional file-based target configuration (`quill.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Target branch.
    pub branch: Option<String>,
    /// Local repository directory.
    pub root_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Parse an `owner/repo` slug (the `GITHUB_REPOSITORY` shape).
///
/// # Example
///
/// ```
/// use quill::core::config::parse_repo_slug;
///
/// let (owner, repo) = parse_repo_slug("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// assert!(parse_repo_slug("just-a-name").is_none());
/// ```
pub fn parse_repo_slug(slug: &str) -> Option<(String, String)> {
    let (owner, repo) = slug.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
