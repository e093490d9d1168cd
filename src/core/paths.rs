//! core::paths
//!
//! Path normalization against the configured repository root.
//!
//! Callers hand the engine paths in whatever shape their tooling
//! produced: repo-relative (`docs/readme.md`), with stray separators
//! (`./docs//readme.md`), or absolute (`/work/repo/docs/readme.md`).
//! All of them must resolve to a location inside the repository root
//! before anything touches the network.
//!
//! # Rules
//!
//! - A relative path is cleaned and used as-is (see [`TreePath::new`])
//! - An absolute path must fall inside the repository root; it is
//!   relativized against the root, which strips the leading separators
//! - An absolute path outside the root is rejected with
//!   [`TypeError::OutsideRoot`]

use std::path::Path;

use super::types::{TreePath, TypeError};

/// Normalize a caller-supplied path into a repo-root-relative [`TreePath`].
///
/// # Errors
///
/// - [`TypeError::OutsideRoot`] if `raw` is absolute and not under `root`
/// - [`TypeError::InvalidPath`] if the path is empty or walks upward
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use quill::core::paths::normalize;
///
/// let root = Path::new("/work/repo");
/// assert_eq!(normalize("a.txt", root).unwrap().as_str(), "a.txt");
/// assert_eq!(normalize("/work/repo/a.txt", root).unwrap().as_str(), "a.txt");
/// assert!(normalize("/etc/passwd", root).is_err());
/// ```
pub fn normalize(raw: &str, root: &Path) -> Result<TreePath, TypeError> {
    let path = Path::new(raw);
    if path.is_absolute() {
        let rel = path
            .strip_prefix(root)
            .map_err(|_| TypeError::OutsideRoot(raw.to_string()))?;
        let rel = rel
            .to_str()
            .ok_or_else(|| TypeError::InvalidPath(format!("'{raw}' is not valid UTF-8")))?;
        TreePath::new(rel)
    } else {
        TreePath::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> &'static Path {
        Path::new("/work/repo")
    }

    #[test]
    fn relative_path_passes_through() {
        assert_eq!(normalize("a.txt", root()).unwrap().as_str(), "a.txt");
        assert_eq!(normalize("b/c.txt", root()).unwrap().as_str(), "b/c.txt");
    }

    #[test]
    fn relative_path_is_cleaned() {
        assert_eq!(normalize("./a.txt", root()).unwrap().as_str(), "a.txt");
        assert_eq!(normalize("b//c.txt", root()).unwrap().as_str(), "b/c.txt");
    }

    #[test]
    fn absolute_path_inside_root_is_relativized() {
        assert_eq!(
            normalize("/work/repo/a.txt", root()).unwrap().as_str(),
            "a.txt"
        );
        assert_eq!(
            normalize("/work/repo/b/c.txt", root()).unwrap().as_str(),
            "b/c.txt"
        );
    }

    #[test]
    fn absolute_path_outside_root_is_rejected() {
        let err = normalize("/etc/passwd", root()).unwrap_err();
        assert!(matches!(err, TypeError::OutsideRoot(_)));
    }

    #[test]
    fn sibling_prefix_is_not_inside_root() {
        // "/work/repository" shares a string prefix with the root but is
        // a different directory.
        let err = normalize("/work/repository/a.txt", root()).unwrap_err();
        assert!(matches!(err, TypeError::OutsideRoot(_)));
    }

    #[test]
    fn upward_walk_is_rejected() {
        assert!(normalize("../a.txt", root()).is_err());
        assert!(normalize("b/../../a.txt", root()).is_err());
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(normalize("", root()).is_err());
    }
}
