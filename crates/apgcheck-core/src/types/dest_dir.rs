//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

/// The canonical root a package is extracted into.
///
/// A `DestDir` is guaranteed to be an existing, empty (at construction),
/// absolute canonical directory. Every [`SafePath`](super::SafePath) is
/// checked for containment against this canonical form.
///
/// # Examples
///
/// ```no_run
/// use apgcheck_core::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::prepare("/tmp/apgcheck-quarantine")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Prepares `path` as an extraction root.
    ///
    /// Creates the directory (and its ancestors) if it does not exist yet.
    /// An existing path must be an empty directory. The result is
    /// canonicalized, so a symlinked destination resolves to its real
    /// location before any containment check.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if:
    /// - the path exists but is not a directory
    /// - the directory exists and is not empty
    /// - creation or canonicalization fails
    pub fn prepare(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::metadata(path) {
            Ok(meta) if !meta.is_dir() => {
                return Err(ExtractionError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("destination is not a directory: {}", path.display()),
                )));
            }
            Ok(_) => {
                if fs::read_dir(path)?.next().is_some() {
                    return Err(ExtractionError::Io(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("destination directory is not empty: {}", path.display()),
                    )));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(path).map_err(|e| {
                    ExtractionError::Io(io::Error::new(
                        e.kind(),
                        format!("failed to create destination {}: {e}", path.display()),
                    ))
                })?;
            }
            Err(e) => return Err(ExtractionError::Io(e)),
        }

        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {e}", path.display()),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Returns the canonical root as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}
