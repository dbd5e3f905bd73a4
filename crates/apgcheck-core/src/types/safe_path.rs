//! Sanitized entry target type.

use crate::ExtractionError;
use crate::PathViolation;
use crate::Result;
use crate::SecurityConfig;
use std::fs;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

const SEPARATOR: u8 = b'/';
const PARENT: &[u8] = b"..";

/// A sanitized, destination-relative target for one archive entry.
///
/// `SafePath` is the only way extraction turns an attacker-controlled entry
/// name into a filesystem path. A value guarantees that the name:
/// - is relative (no leading `/`, no root or prefix component)
/// - has no `..` segment, neither as declared nor after cleaning
/// - has no NUL byte
/// - is at most `max_name_length` bytes once cleaned
/// - resolves inside the canonical destination root, following any
///   directories already on disk
///
/// There is no `From<PathBuf>` implementation.
///
/// # Examples
///
/// ```no_run
/// use apgcheck_core::DestDir;
/// use apgcheck_core::SafePath;
/// use apgcheck_core::SecurityConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::prepare("/tmp/quarantine")?;
/// let config = SecurityConfig::default();
///
/// let safe = SafePath::sanitize(b"data//usr/./bin/tool", &dest, &config)?;
/// assert_eq!(safe.as_path(), std::path::Path::new("data/usr/bin/tool"));
///
/// assert!(SafePath::sanitize(b"data/../../etc/passwd", &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Sanitizes a raw entry name against `dest`.
    ///
    /// Lexical guards run first and never touch the filesystem. The
    /// containment guard then canonicalizes the deepest existing ancestor of
    /// the joined target and re-appends the part that does not exist yet.
    ///
    /// # Errors
    ///
    /// - `PathSecurity` with `Absolute`, `Traversal`, `NulByte`, `TooLong`
    ///   or `OutsideDestination`
    /// - `Io` if probing the existing ancestors fails for another reason
    pub fn sanitize(raw: &[u8], dest: &DestDir, config: &SecurityConfig) -> Result<Self> {
        let reject = |violation| ExtractionError::path(&display_name(raw), violation);

        if raw.first() == Some(&SEPARATOR) {
            return Err(reject(PathViolation::Absolute));
        }
        if has_parent_segment(raw) {
            return Err(reject(PathViolation::Traversal));
        }

        let cleaned = clean_name(raw);
        if has_parent_segment(&cleaned) {
            return Err(reject(PathViolation::Traversal));
        }
        if cleaned.len() > config.max_name_length {
            return Err(reject(PathViolation::TooLong {
                len: cleaned.len(),
                max: config.max_name_length,
            }));
        }
        if cleaned.contains(&0) {
            return Err(reject(PathViolation::NulByte));
        }

        let relative = if cleaned == b"." {
            PathBuf::new()
        } else {
            bytes_to_path(&cleaned)
        };

        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir => return Err(reject(PathViolation::Traversal)),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(reject(PathViolation::Absolute));
                }
            }
        }

        if !resolves_within(dest.as_path(), &relative)? {
            return Err(reject(PathViolation::OutsideDestination));
        }

        Ok(Self(relative))
    }

    /// Returns the destination-relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the entry names the destination root itself (`./`).
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

/// Lexically cleans a `/`-separated entry name.
///
/// Repeated separators collapse, `.` segments are dropped, `name/..` pairs
/// cancel out and a trailing separator is stripped. A leading `..` that
/// cannot be cancelled is kept (dropped on a rooted name). An empty result
/// becomes `.`.
///
/// ```
/// use apgcheck_core::types::clean_name;
///
/// assert_eq!(clean_name(b"a//b/./c/"), b"a/b/c");
/// assert_eq!(clean_name(b"a/b/../c"), b"a/c");
/// assert_eq!(clean_name(b"../x"), b"../x");
/// assert_eq!(clean_name(b"./"), b".");
/// ```
#[must_use]
pub fn clean_name(raw: &[u8]) -> Vec<u8> {
    let rooted = raw.first() == Some(&SEPARATOR);
    let mut segments: Vec<&[u8]> = Vec::new();

    for segment in raw.split(|&b| b == SEPARATOR) {
        match segment {
            b"" | b"." => {}
            PARENT => {
                if segments.last().is_some_and(|last| *last != PARENT) {
                    segments.pop();
                } else if !rooted {
                    segments.push(segment);
                }
            }
            _ => segments.push(segment),
        }
    }

    let mut cleaned = Vec::with_capacity(raw.len());
    if rooted {
        cleaned.push(SEPARATOR);
    }
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            cleaned.push(SEPARATOR);
        }
        cleaned.extend_from_slice(segment);
    }
    if cleaned.is_empty() {
        cleaned.push(b'.');
    }
    cleaned
}

fn has_parent_segment(name: &[u8]) -> bool {
    name.split(|&b| b == SEPARATOR).any(|segment| segment == PARENT)
}

/// Entry name for error messages; non-UTF-8 bytes are replaced.
pub(crate) fn display_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Checks that `root.join(relative)` stays under `root` once every existing
/// ancestor is canonicalized.
///
/// `root` must already be canonical. A component that exists but cannot be
/// canonicalized (a dangling symlink) counts as escaping.
fn resolves_within(root: &Path, relative: &Path) -> io::Result<bool> {
    let joined = root.join(relative);
    let mut existing = joined.as_path();
    let mut missing = Vec::new();

    loop {
        match fs::symlink_metadata(existing) {
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(name), Some(parent)) = (existing.file_name(), existing.parent()) else {
                    return Ok(false);
                };
                missing.push(name.to_os_string());
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }

    let canonical = match existing.canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    let resolved = missing
        .iter()
        .rev()
        .fold(canonical, |acc, name| acc.join(name));

    Ok(resolved.starts_with(root))
}
