use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file seen during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// An entry the walk could not read and skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl From<Error> for ScanIssue {
    fn from(err: Error) -> Self {
        let path = match &err {
            Error::ScanAccess { path, .. } => path.clone(),
            _ => None,
        };
        ScanIssue {
            path,
            message: err.to_string(),
        }
    }
}

/// Read-only walker rooted at an absolute directory
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
}

impl Scanner {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ScanRootNotFound(root.to_path_buf()),
            _ => Error::Io(e),
        })?;

        if !canonical.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "scan root {} is not a directory",
                canonical.display()
            )));
        }

        Ok(Scanner { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh walk of the tree
    pub fn scan(&self) -> Scan {
        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Scan {
            entries,
            issues: Vec::new(),
        }
    }
}

/// Lazy, single-pass sequence of the regular files under a root.
///
/// Unreadable entries are skipped and collected in [`Scan::issues`].
pub struct Scan {
    entries: walkdir::IntoIter,
    issues: Vec<ScanIssue>,
}

impl Scan {
    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ScanIssue> {
        self.issues
    }

    fn skip(&mut self, err: Error) {
        log::debug!("skipping entry: {err}");
        self.issues.push(err.into());
    }
}

impl Iterator for Scan {
    type Item = FileRecord;

    fn next(&mut self) -> Option<FileRecord> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.skip(err.into());
                    continue;
                }
            };

            // Directories and symlinks (to anything) are not counted
            if !entry.file_type().is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(meta) => {
                    return Some(FileRecord {
                        path: entry.into_path(),
                        size_bytes: meta.len(),
                    });
                }
                // Removed between listing and stat
                Err(err) if err.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound) => {
                    continue;
                }
                Err(err) => self.skip(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, len: usize) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", 10);
        write(dir.path(), "sub/b.bin", 20);
        write(dir.path(), "sub/deeper/c.log", 30);
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_visits_each_regular_file_once() {
        let dir = tree();
        let scanner = Scanner::new(dir.path()).unwrap();
        let records: Vec<_> = scanner.scan().collect();

        assert_eq!(records.len(), 3);
        let unique: BTreeSet<_> = records.iter().map(|r| r.path.clone()).collect();
        assert_eq!(unique.len(), 3);
        assert!(records.iter().all(|r| r.path.is_absolute()));

        let sizes: BTreeSet<_> = records.iter().map(|r| r.size_bytes).collect();
        assert_eq!(sizes, BTreeSet::from([10, 20, 30]));
    }

    #[test]
    fn test_rescan_is_identical() {
        let dir = tree();
        let scanner = Scanner::new(dir.path()).unwrap();
        let first: Vec<_> = scanner.scan().collect();
        let second: Vec<_> = scanner.scan().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = Scanner::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::ScanRootNotFound(_)));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let dir = tree();
        let err = Scanner::new(dir.path().join("a.txt")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("sub"), dir.path().join("link-dir")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("a.txt"), dir.path().join("link-file"))
            .unwrap();

        let scanner = Scanner::new(dir.path()).unwrap();
        assert_eq!(scanner.scan().count(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subtree_does_not_abort() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("locked");
        write(dir.path(), "locked/hidden.bak", 5);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let scanner = Scanner::new(dir.path()).unwrap();
        let mut scan = scanner.scan();
        let records: Vec<_> = scan.by_ref().collect();

        // Root ignores directory permissions, so only assert when they bite
        if fs::read_dir(&locked).is_err() {
            assert_eq!(records.len(), 3);
            assert_eq!(scan.issues().len(), 1);
            let expected = scanner.root().join("locked");
            assert_eq!(scan.issues()[0].path.as_deref(), Some(expected.as_path()));
        } else {
            assert_eq!(records.len(), 4);
        }

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
