//! Per-operation scratch space for extracted archive members.

use std::fs::File;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::Result;
use crate::StripError;

const SCRATCH_PREFIX: &str = ".arcscrub-";

/// A private temporary directory owned by exactly one operation.
///
/// Dropping a `ScratchSpace` removes it on a best-effort basis, which covers
/// early returns on failure paths. On success paths callers use
/// [`ScratchSpace::reclaim`] so that a failed removal is reported instead of
/// swallowed.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Creates a uniquely named scratch directory under `root`, or under the
    /// system temp directory when `root` is `None`.
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(Self { dir })
    }

    /// Returns the scratch directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates an empty file for `member` inside the scratch space, along
    /// with any parent directories.
    ///
    /// `member` must already be normalized with [`normalize_member_path`].
    pub fn create_member(&self, member: &Path) -> Result<(PathBuf, File)> {
        let target = self.dir.path().join(member);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&target)?;
        Ok((target, file))
    }

    /// Deletes one extracted member file.
    pub fn discard(&self, file: &Path) -> Result<()> {
        std::fs::remove_file(file).map_err(|source| StripError::ScratchReclaimFailure {
            path: file.to_path_buf(),
            source,
        })
    }

    /// Removes the scratch directory and everything left in it.
    pub fn reclaim(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| StripError::ScratchReclaimFailure { path, source })
    }
}

/// Normalizes an archive member path into a relative path that cannot leave
/// the directory it is joined onto.
///
/// `.` components are dropped. Absolute paths, `..` components and NUL bytes
/// are rejected. An empty result (for example `./`) is returned as an empty
/// path; callers decide whether that is meaningful for the member kind.
///
/// # Examples
///
/// ```
/// use arcscrub_core::engine::scratch::normalize_member_path;
/// use std::path::Path;
///
/// let path = normalize_member_path(Path::new("./docs/a.txt")).unwrap();
/// assert_eq!(path, Path::new("docs/a.txt"));
///
/// assert!(normalize_member_path(Path::new("../escape")).is_err());
/// assert!(normalize_member_path(Path::new("/etc/passwd")).is_err());
/// ```
pub fn normalize_member_path(raw: &Path) -> Result<PathBuf> {
    if has_null_bytes(raw) {
        return Err(unsafe_path(raw));
    }

    let mut normalized = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path(raw));
            }
        }
    }
    Ok(normalized)
}

fn unsafe_path(raw: &Path) -> StripError {
    StripError::UnsafeMemberPath {
        path: raw.to_path_buf(),
    }
}

#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&0)
}

#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_string_lossy().contains('\0')
}
