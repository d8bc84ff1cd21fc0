//! Deletes stale generated files from a project's outdir.
//!
//! A file is stale when it carries the generated-file marker but no file
//! component claims its path any more. Hand-written files never carry the
//! marker and are never touched.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, instrument, trace};

use crate::{
    application::ports::Filesystem,
    domain::{DomainError, contains_marker},
    error::{StrataError, StrataResult},
};

/// Globs excluded from every cleanup pass.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".git/**"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a cleanup pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Deleted files.
    pub removed: Vec<PathBuf>,
    /// Directories deleted because cleanup emptied them.
    pub pruned: Vec<PathBuf>,
}

/// Remove marker-carrying files under `dir` that are not in `generated`.
///
/// `excludes` are globs relative to `dir`. Directories emptied by a deletion
/// are pruned deepest first; `dir` itself is never removed.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn cleanup(
    fs: &dyn Filesystem,
    dir: &Path,
    generated: &HashSet<PathBuf>,
    excludes: &[String],
) -> StrataResult<CleanupReport> {
    let patterns = compile(excludes)?;
    let mut report = CleanupReport::default();
    let mut touched = BTreeSet::new();

    for path in fs.list_files(dir)? {
        if generated.contains(&path) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let relative = to_slash(relative);
        if patterns.iter().any(|p| p.matches_with(&relative, MATCH_OPTIONS)) {
            trace!(path = %relative, "excluded from cleanup");
            continue;
        }

        let Some(bytes) = fs.read_file(&path)? else {
            continue;
        };
        if !contains_marker(&bytes) {
            continue;
        }

        if fs.remove_file(&path)? {
            debug!(path = %path.display(), "removed stale generated file");
            if let Some(parent) = path.parent() {
                touched.insert(parent.to_path_buf());
            }
            report.removed.push(path);
        }
    }

    report.pruned = prune(fs, dir, touched)?;
    Ok(report)
}

fn compile(excludes: &[String]) -> StrataResult<Vec<Pattern>> {
    DEFAULT_EXCLUDES
        .iter()
        .copied()
        .chain(excludes.iter().map(String::as_str))
        .map(|glob| {
            Pattern::new(glob).map_err(|e| {
                StrataError::from(DomainError::InvalidGlob {
                    pattern: glob.into(),
                    reason: e.msg.to_string(),
                })
            })
        })
        .collect()
}

/// Remove emptied directories between each touched directory and `root`.
fn prune(fs: &dyn Filesystem, root: &Path, touched: BTreeSet<PathBuf>) -> StrataResult<Vec<PathBuf>> {
    let mut candidates = BTreeSet::new();
    for dir in touched {
        let mut current = Some(dir.as_path());
        while let Some(d) = current {
            if d == root || !d.starts_with(root) {
                break;
            }
            candidates.insert(d.to_path_buf());
            current = d.parent();
        }
    }

    let mut ordered: Vec<PathBuf> = candidates.into_iter().collect();
    ordered.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

    let mut pruned = Vec::new();
    for dir in ordered {
        if fs.remove_dir_if_empty(&dir)? {
            debug!(dir = %dir.display(), "pruned empty directory");
            pruned.push(dir);
        }
    }
    Ok(pruned)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::application::ApplicationError;
    use crate::domain::MARKER;
    use mockall::predicate::eq;

    fn marked() -> Vec<u8> {
        format!("# {MARKER}\nstale\n").into_bytes()
    }

    #[test]
    fn removes_only_marked_files_outside_generation_set() {
        let root = PathBuf::from("/repo");
        let mut fs = MockFilesystem::new();
        fs.expect_list_files().returning(|_| {
            Ok(vec![
                PathBuf::from("/repo/keep.txt"),
                PathBuf::from("/repo/gen/stale.txt"),
                PathBuf::from("/repo/user.txt"),
            ])
        });
        fs.expect_read_file()
            .with(eq(PathBuf::from("/repo/gen/stale.txt")))
            .returning(|_| Ok(Some(marked())));
        fs.expect_read_file()
            .with(eq(PathBuf::from("/repo/user.txt")))
            .returning(|_| Ok(Some(b"mine".to_vec())));
        fs.expect_remove_file()
            .with(eq(PathBuf::from("/repo/gen/stale.txt")))
            .times(1)
            .returning(|_| Ok(true));
        fs.expect_remove_dir_if_empty()
            .with(eq(PathBuf::from("/repo/gen")))
            .times(1)
            .returning(|_| Ok(true));

        let generated = HashSet::from([PathBuf::from("/repo/keep.txt")]);
        let report = cleanup(&fs, &root, &generated, &[]).unwrap();

        assert_eq!(report.removed, [PathBuf::from("/repo/gen/stale.txt")]);
        assert_eq!(report.pruned, [PathBuf::from("/repo/gen")]);
    }

    #[test]
    fn excluded_and_git_paths_are_never_read() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files().returning(|_| {
            Ok(vec![
                PathBuf::from("/repo/.git/HEAD"),
                PathBuf::from("/repo/fixtures/data/a.json"),
            ])
        });
        fs.expect_read_file().never();
        fs.expect_remove_file().never();

        let report = cleanup(
            &fs,
            Path::new("/repo"),
            &HashSet::new(),
            &["fixtures/**".to_string()],
        )
        .unwrap();
        assert!(report.removed.is_empty());
    }

    #[test]
    fn vanished_files_are_skipped() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(|_| Ok(vec![PathBuf::from("/repo/gone.txt")]));
        fs.expect_read_file().returning(|_| Ok(None));
        fs.expect_remove_file().never();

        let report = cleanup(&fs, Path::new("/repo"), &HashSet::new(), &[]).unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn read_errors_are_surfaced() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(|_| Ok(vec![PathBuf::from("/repo/locked.txt")]));
        fs.expect_read_file().returning(|p| {
            Err(ApplicationError::FilesystemError {
                path: p.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into())
        });

        let err = cleanup(&fs, Path::new("/repo"), &HashSet::new(), &[]).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[test]
    fn pruning_walks_up_but_stops_at_root() {
        let mut fs = MockFilesystem::new();
        fs.expect_list_files()
            .returning(|_| Ok(vec![PathBuf::from("/repo/a/b/c.txt")]));
        fs.expect_read_file().returning(|_| Ok(Some(marked())));
        fs.expect_remove_file().returning(|_| Ok(true));

        let mut seq = mockall::Sequence::new();
        fs.expect_remove_dir_if_empty()
            .with(eq(PathBuf::from("/repo/a/b")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        fs.expect_remove_dir_if_empty()
            .with(eq(PathBuf::from("/repo/a")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let report = cleanup(&fs, Path::new("/repo"), &HashSet::new(), &[]).unwrap();
        assert_eq!(report.pruned, [PathBuf::from("/repo/a/b")]);
    }

    #[test]
    fn invalid_exclude_is_rejected() {
        let fs = MockFilesystem::new();
        let err = cleanup(&fs, Path::new("/repo"), &HashSet::new(), &["a/***".into()]).unwrap_err();
        assert!(matches!(err, StrataError::Domain(DomainError::InvalidGlob { .. })));
    }
}
