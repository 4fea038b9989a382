//! Backend-relative path helpers.
//!
//! Paths inside a backend are plain strings with `/` separators, relative to the
//! backend root. The empty string names the root itself. Everything that reaches a
//! backend primitive goes through `normalize` first.

use std::path::{Component, Path, PathBuf};

use crate::errors::BackendError;

/// Normalize a backend path: drop empty and `.` segments, resolve `..`,
/// strip leading/trailing `/`. Fails if `..` would climb above the root.
pub fn normalize(path: &str) -> Result<String, BackendError> {
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(BackendError::InvalidPath {
                        path: path.to_string(),
                        reason: "escapes the backend root",
                    });
                }
            }
            s if s.contains('\0') => {
                return Err(BackendError::InvalidPath {
                    path: path.to_string(),
                    reason: "contains a NUL byte",
                });
            }
            s => parts.push(s),
        }
    }
    Ok(parts.join("/"))
}

/// Parent of a normalized path; `""` for top-level entries and the root.
pub fn parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((head, _)) => head,
        None => "",
    }
}

/// Segments of a normalized path.
pub fn parts(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join a child name onto a normalized base.
pub fn join(base: &str, child: &str) -> String {
    match (base.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{child}"),
    }
}

/// True if `path` lies strictly below `ancestor` (both normalized).
pub fn is_descendant(ancestor: &str, path: &str) -> bool {
    if ancestor.is_empty() {
        return !path.is_empty();
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Map a normalized backend path onto a host directory.
pub fn to_host(root: &Path, path: &str) -> PathBuf {
    let mut host = root.to_path_buf();
    for seg in parts(path) {
        host.push(seg);
    }
    host
}

/// Convert a relative host path into backend form. Returns `None` for anything
/// that is not a plain sequence of normal components (or is not UTF-8).
pub fn from_relative(rel: &Path) -> Option<String> {
    let mut out: Vec<&str> = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(os) => out.push(os.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out.join("/"))
}

/// Lexically normalize an absolute host path (resolves `.` and `..` without
/// touching the filesystem).
pub fn clean_host(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_segments() {
        assert_eq!(normalize("/a//b/./c/").unwrap(), "a/b/c");
        assert_eq!(normalize("a/b/../c").unwrap(), "a/c");
        assert_eq!(normalize("").unwrap(), "");
        assert_eq!(normalize("./").unwrap(), "");
    }

    #[test]
    fn normalize_rejects_escape() {
        let err = normalize("a/../../b").unwrap_err();
        assert!(matches!(err, BackendError::InvalidPath { .. }));
    }

    #[test]
    fn parent_of_nested_and_top_level() {
        assert_eq!(parent("tgt/file.txt"), "tgt");
        assert_eq!(parent("file.txt"), "");
        assert_eq!(parent("a/b/c"), "a/b");
    }

    #[test]
    fn descendant_checks_segment_boundary() {
        assert!(is_descendant("src", "src/a"));
        assert!(!is_descendant("src", "srcx/a"));
        assert!(!is_descendant("src", "src"));
        assert!(is_descendant("", "anything"));
    }

    #[test]
    fn relative_host_paths_convert() {
        assert_eq!(from_relative(Path::new("from/cwd")).as_deref(), Some("from/cwd"));
        assert_eq!(from_relative(Path::new("./x")).as_deref(), Some("x"));
        assert!(from_relative(Path::new("../x")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn clean_host_resolves_dots() {
        assert_eq!(clean_host(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
    }
}
