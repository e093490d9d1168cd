//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`TreePath`] - Normalized repo-root-relative file path
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use quill::core::types::{BranchName, Oid, TreePath};
//!
//! // Valid constructions
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let path = TreePath::new("/docs/readme.md").unwrap();
//! assert_eq!(path.as_str(), "docs/readme.md");
//!
//! // Invalid constructions fail at creation time
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! assert!(TreePath::new("../escape").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("path escapes the repository root: {0}")]
    OutsideRoot(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty, or be exactly `@`
/// - Cannot start with `.` or `-`, or end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///
/// # Example
///
/// ```
/// use quill::core::types::BranchName;
///
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's
    /// refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Validate a branch name against Git's refname rules.
    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '.' or '-'".into(),
            ));
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }
        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{pattern}'"
                )));
            }
        }
        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        for c in INVALID_CHARS {
            if name.contains(c) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{c}'"
                )));
            }
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot contain control characters".into(),
            ));
        }
        for component in name.split('/') {
            if component.starts_with('.') || component.ends_with(".lock") {
                return Err(TypeError::InvalidBranchName(
                    "path component cannot start with '.' or end with '.lock'".into(),
                ));
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use quill::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Expected length of a hex SHA-1 object id.
    const SHA1_LEN: usize = 40;

    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a 40-character
    /// hex SHA.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != Self::SHA1_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} hex characters, got {}",
                Self::SHA1_LEN,
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get the OID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalized, repo-root-relative file path for tree entries.
///
/// Construction cleans the raw input:
/// - Leading path separators are stripped
/// - Empty segments and `.` segments are dropped
/// - `..` segments are rejected (no walking out of the repository)
///
/// The stored form uses `/` separators and never starts with one, which
/// is the shape Git tree entries require.
///
/// # Example
///
/// ```
/// use quill::core::types::TreePath;
///
/// assert_eq!(TreePath::new("/a.txt").unwrap().as_str(), "a.txt");
/// assert_eq!(TreePath::new("./b//c.txt").unwrap().as_str(), "b/c.txt");
/// assert!(TreePath::new("").is_err());
/// assert!(TreePath::new("a/../b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TreePath(String);

impl TreePath {
    /// Create a new normalized tree path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if the path is empty after
    /// normalization or contains a `..` segment.
    pub fn new(path: impl AsRef<str>) -> Result<Self, TypeError> {
        let raw = path.as_ref();
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(TypeError::InvalidPath(format!(
                        "'{raw}' contains a '..' segment"
                    )));
                }
                s => segments.push(s),
            }
        }
        if segments.is_empty() {
            return Err(TypeError::InvalidPath(format!(
                "'{raw}' does not name a file"
            )));
        }
        Ok(Self(segments.join("/")))
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TreePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TreePath> for String {
    fn from(path: TreePath) -> Self {
        path.0
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_valid_names() {
            for name in ["main", "feature/my-branch", "user@feature", "v1.2.3"] {
                assert!(BranchName::new(name).is_ok(), "rejected {name}");
            }
        }

        #[test]
        fn rejects_invalid_names() {
            for name in [
                "",
                "@",
                ".hidden",
                "-flag",
                "branch.lock",
                "trailing/",
                "a..b",
                "a@{b",
                "a//b",
                "has space",
                "has~tilde",
                "has:colon",
            ] {
                assert!(BranchName::new(name).is_err(), "accepted {name}");
            }
        }

        #[test]
        fn rejects_dotted_component() {
            assert!(BranchName::new("feature/.hidden").is_err());
            assert!(BranchName::new("feature/x.lock").is_err());
        }

        #[test]
        fn serde_round_trip() {
            let name = BranchName::new("main").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, "\"main\"");
            let back: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(back, name);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<BranchName, _> = serde_json::from_str("\"bad name\"");
            assert!(result.is_err());
        }
    }

    mod oid {
        use super::*;

        const SHA: &str = "abc123def4567890abc123def4567890abc12345";

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new(SHA.to_uppercase()).unwrap();
            assert_eq!(oid.as_str(), SHA);
        }

        #[test]
        fn rejects_wrong_length() {
            assert!(Oid::new("abc123").is_err());
            assert!(Oid::new(format!("{SHA}ff")).is_err());
        }

        #[test]
        fn rejects_non_hex() {
            assert!(Oid::new("zzz123def4567890abc123def4567890abc12345").is_err());
        }

        #[test]
        fn short_truncates() {
            let oid = Oid::new(SHA).unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100), SHA);
        }
    }

    mod tree_path {
        use super::*;

        #[test]
        fn strips_leading_separator() {
            assert_eq!(TreePath::new("/a.txt").unwrap().as_str(), "a.txt");
            assert_eq!(TreePath::new("//a.txt").unwrap().as_str(), "a.txt");
        }

        #[test]
        fn drops_dot_and_empty_segments() {
            assert_eq!(TreePath::new("./a/./b.txt").unwrap().as_str(), "a/b.txt");
            assert_eq!(TreePath::new("a//b.txt").unwrap().as_str(), "a/b.txt");
        }

        #[test]
        fn keeps_nested_paths() {
            assert_eq!(TreePath::new("b/c.txt").unwrap().as_str(), "b/c.txt");
        }

        #[test]
        fn rejects_parent_segments() {
            assert!(TreePath::new("../a.txt").is_err());
            assert!(TreePath::new("a/../b.txt").is_err());
        }

        #[test]
        fn rejects_empty() {
            assert!(TreePath::new("").is_err());
            assert!(TreePath::new("/").is_err());
            assert!(TreePath::new("./.").is_err());
        }
    }
}
