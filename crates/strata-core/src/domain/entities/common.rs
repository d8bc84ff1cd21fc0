use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;

/// A filesystem path guaranteed to be **relative** and lexically normalized.
///
/// Generated files are addressed relative to their project's outdir. The
/// path never contains `.` segments and never climbs above the project root
/// with `..`, so two spellings of the same file compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Create a relative path, rejecting absolute, empty or escaping input.
    pub fn try_new(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if path.is_absolute() || path.has_root() {
            return Err(DomainError::AbsolutePathNotAllowed {
                path: path.display().to_string(),
            });
        }

        let mut out = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(seg) => out.push(seg),
                Component::ParentDir => {
                    if !out.pop() {
                        return Err(DomainError::InvalidPath {
                            path: path.display().to_string(),
                            reason: "path escapes the project root".into(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::AbsolutePathNotAllowed {
                        path: path.display().to_string(),
                    });
                }
            }
        }

        if out.as_os_str().is_empty() {
            return Err(DomainError::InvalidPath {
                path: path.display().to_string(),
                reason: "path is empty".into(),
            });
        }

        Ok(Self(out))
    }

    /// Join a path segment onto this relative path.
    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment))
    }

    /// Borrow as a `Path`.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Forward-slash form, as used for glob matching and manifests.
    pub fn to_slash_string(&self) -> String {
        self.0
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Consume into a `PathBuf`.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        RelativePath::try_new(s)
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_slash_string())
    }
}

/// Normalize an absolute path lexically, removing `.` and `..`.
///
/// Does not touch the filesystem, so symlinks are not resolved. Outdirs are
/// compared with this, never with `canonicalize`, because they usually do not
/// exist yet when the tree is built.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek().cloned() {
        components.next();
        PathBuf::from(c.as_os_str())
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => {}
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Permission model for generated files.
///
/// Generated files are read-only by default so that hand edits fail loudly
/// instead of being silently overwritten on the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Permissions {
    readonly: bool,
    executable: bool,
}

impl Permissions {
    /// Read-only, not executable. The default for generated files.
    pub const fn read_only() -> Self {
        Self {
            readonly: true,
            executable: false,
        }
    }

    /// Read and write permissions.
    pub const fn read_write() -> Self {
        Self {
            readonly: false,
            executable: false,
        }
    }

    pub const fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub const fn with_executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }

    pub const fn readonly(&self) -> bool {
        self.readonly
    }

    pub const fn executable(&self) -> bool {
        self.executable
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------------
    // RelativePath
    // ---------------------------------------------------------------------

    #[test]
    fn relative_path_accepts_relative() {
        let p = RelativePath::try_new("src/main.rs").unwrap();
        assert_eq!(p.as_path(), Path::new("src/main.rs"));
    }

    #[test]
    fn relative_path_is_normalized() {
        assert_eq!(
            RelativePath::try_new("./a/b/../gen.txt").unwrap(),
            RelativePath::try_new("a/gen.txt").unwrap()
        );
    }

    #[test]
    fn try_from_str_rejects_escaping_paths() {
        assert!(RelativePath::try_from("a/../../b").is_err());
        assert_eq!(
            RelativePath::try_from("a/./b").unwrap(),
            RelativePath::try_new("a/b").unwrap()
        );
    }

    #[test]
    fn try_new_rejects_absolute() {
        assert!(matches!(
            RelativePath::try_new("/etc/passwd"),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn try_new_rejects_escape_and_empty() {
        assert!(matches!(
            RelativePath::try_new("../outside"),
            Err(DomainError::InvalidPath { .. })
        ));
        assert!(matches!(
            RelativePath::try_new("."),
            Err(DomainError::InvalidPath { .. })
        ));
    }

    #[test]
    fn join_relative_path() {
        let base = RelativePath::try_new("src").unwrap();
        let joined = base.join("main.rs").unwrap();
        assert_eq!(joined.as_path(), Path::new("src/main.rs"));
        assert!(base.join("/etc/passwd").is_err());
    }

    #[test]
    fn slash_string_uses_forward_slashes() {
        assert_eq!(RelativePath::try_new("a/b/c.txt").unwrap().to_slash_string(), "a/b/c.txt");
    }

    #[test]
    fn normalize_path_resolves_dots() {
        assert_eq!(
            normalize_path(Path::new("/repo/./pkgs/../pkgs/a")),
            PathBuf::from("/repo/pkgs/a")
        );
    }

    // ---------------------------------------------------------------------
    // Permissions
    // ---------------------------------------------------------------------

    #[test]
    fn permissions_defaults_to_read_only() {
        let p = Permissions::default();
        assert!(p.readonly());
        assert!(!p.executable());
    }

    #[test]
    fn permissions_builders() {
        let p = Permissions::read_write().with_executable(true);
        assert!(!p.readonly());
        assert!(p.executable());
    }
}
