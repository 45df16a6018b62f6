//! Core domain types for docmake.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{DocmakeError, Result};

// ---------------------------------------------------------------------------
// ProjectRoot
// ---------------------------------------------------------------------------

/// Absolute directory containing the entry script.
///
/// Computed once per invocation and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectRoot(PathBuf);

impl ProjectRoot {
    /// Resolve the root from an entry script path.
    ///
    /// A relative `entry` is taken relative to `cwd`. Symlinks are not
    /// followed, so the entry does not need to exist.
    pub fn from_entry(entry: &Path, cwd: &Path) -> Result<Self> {
        if entry.as_os_str().is_empty() {
            return Err(DocmakeError::validation("entry path is empty"));
        }

        let joined = if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            if !cwd.is_absolute() {
                return Err(DocmakeError::validation(format!(
                    "working directory '{}' is not absolute",
                    cwd.display()
                )));
            }
            cwd.join(entry)
        };

        let entry = normalize_lexically(&joined);
        let parent = entry.parent().ok_or_else(|| {
            DocmakeError::validation(format!(
                "entry '{}' has no containing directory",
                entry.display()
            ))
        })?;

        Ok(Self(parent.to_path_buf()))
    }

    /// Resolve the root from an entry path relative to the process working directory.
    pub fn from_entry_in_cwd(entry: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| DocmakeError::io(".", e))?;
        Self::from_entry(entry, &cwd)
    }

    /// The root as a path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Join a relative path onto the root.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.0.join(rel)
    }
}

impl AsRef<Path> for ProjectRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for ProjectRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Remove `.` components and fold `..` into its parent without touching the filesystem.
///
/// `..` at the root stays at the root, matching POSIX path semantics.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_root {
                    if !out.has_root() {
                        out.push("..");
                    }
                } else if out.ends_with("..") {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn root_is_entry_parent_regardless_of_cwd() {
        let root = ProjectRoot::from_entry(Path::new("/repo/docs/make"), Path::new("/tmp"))
            .expect("resolve");
        assert_eq!(root.as_path(), Path::new("/repo/docs"));

        let again = ProjectRoot::from_entry(Path::new("/repo/docs/make"), Path::new("/var/lib"))
            .expect("resolve");
        assert_eq!(root, again);
    }

    #[test]
    fn relative_entry_joins_cwd() {
        let root = ProjectRoot::from_entry(Path::new("docs/make"), Path::new("/repo"))
            .expect("resolve");
        assert_eq!(root.as_path(), Path::new("/repo/docs"));

        let root = ProjectRoot::from_entry(Path::new("make"), Path::new("/repo/docs"))
            .expect("resolve");
        assert_eq!(root.as_path(), Path::new("/repo/docs"));
    }

    #[test]
    fn dot_components_are_normalized() {
        let root = ProjectRoot::from_entry(Path::new("./docs/../docs/./make"), Path::new("/repo"))
            .expect("resolve");
        assert_eq!(root.as_path(), Path::new("/repo/docs"));

        let root = ProjectRoot::from_entry(Path::new("../make"), Path::new("/repo/docs"))
            .expect("resolve");
        assert_eq!(root.as_path(), Path::new("/repo"));
    }

    #[test]
    fn entry_without_parent_is_rejected() {
        let err = ProjectRoot::from_entry(Path::new("/"), Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("no containing directory"));

        let err = ProjectRoot::from_entry(Path::new(""), Path::new("/tmp")).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn relative_cwd_is_rejected_for_relative_entry() {
        let err = ProjectRoot::from_entry(Path::new("make"), Path::new("repo")).unwrap_err();
        assert!(err.to_string().contains("not absolute"));
    }

    #[test]
    fn normalize_keeps_parent_dirs_at_root() {
        assert_eq!(normalize_lexically(Path::new("/../a/b")), PathBuf::from("/a/b"));
        assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexically(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }

    #[test]
    fn root_serializes_as_plain_string() {
        let root = ProjectRoot::from_entry(Path::new("/repo/docs/make"), Path::new("/")).unwrap();
        let json = serde_json::to_string(&root).expect("serialize");
        assert_eq!(json, "\"/repo/docs\"");
        assert_eq!(root.to_string(), "/repo/docs");
    }
}
