//! content - local content source
//!
//! # Design
//!
//! Write mutations embed full file content inline in the tree they
//! submit, so the engine needs file bytes from somewhere. That
//! somewhere is a [`ContentSource`]: given a normalized repo-relative
//! path, return the file's text. The filesystem implementation resolves
//! paths against a configured repository directory; because it only
//! accepts [`TreePath`] values (already cleaned and contained by
//! [`crate::core::paths::normalize`]), a read can never escape that
//! directory.
//!
//! Reads are synchronous and happen once per write entry, immediately
//! before tree construction, so committed content reflects the local
//! filesystem at call time.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::TreePath;

/// Errors from local content reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// The file does not exist under the repository directory.
    #[error("local file not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read as text.
    #[error("failed to read {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// Source of file content for write entries.
pub trait ContentSource: Send + Sync {
    /// Read the file at `path`, resolved against the source's root.
    ///
    /// # Errors
    ///
    /// - [`ContentError::NotFound`] if the file is absent
    /// - [`ContentError::Unreadable`] for any other read failure
    fn read(&self, path: &TreePath) -> Result<String, ContentError>;
}

/// Filesystem-backed content source anchored at a repository directory.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsContentSource {
    fn read(&self, path: &TreePath) -> Result<String, ContentError> {
        let full = self.root.join(path.as_str());
        fs::read_to_string(&full).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ContentError::NotFound(path.to_string()),
            _ => ContentError::Unreadable {
                path: path.to_string(),
                message: e.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn path(s: &str) -> TreePath {
        TreePath::new(s).unwrap()
    }

    #[test]
    fn reads_file_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("a.txt")).unwrap();
        writeln!(file, "hello").unwrap();

        let source = FsContentSource::new(dir.path());
        assert_eq!(source.read(&path("a.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn reads_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/c.txt"), "nested").unwrap();

        let source = FsContentSource::new(dir.path());
        assert_eq!(source.read(&path("b/c.txt")).unwrap(), "nested");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsContentSource::new(dir.path());

        let err = source.read(&path("missing.txt")).unwrap_err();
        assert_eq!(err, ContentError::NotFound("missing.txt".to_string()));
    }
}
