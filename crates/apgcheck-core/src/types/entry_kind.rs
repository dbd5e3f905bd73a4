//! Archive entry kind classification.

use std::fmt;

/// Kind of an entry in the tar stream, as far as extraction cares.
///
/// Only [`File`](Self::File) and [`Directory`](Self::Directory) are ever
/// materialized. Links are rejected outright, everything else is skipped.
///
/// # Examples
///
/// ```
/// use apgcheck_core::EntryKind;
///
/// let kind = EntryKind::from(tar::EntryType::Symlink);
/// assert!(kind.is_link());
///
/// let kind = EntryKind::from(tar::EntryType::Fifo);
/// assert!(kind.is_skipped());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Hard link.
    Hardlink,
    /// Device, FIFO, sparse file, global header or any unknown type flag.
    Other(u8),
}

impl EntryKind {
    /// Returns `true` for symbolic and hard links.
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(self, Self::Symlink | Self::Hardlink)
    }

    /// Returns `true` for kinds that are skipped with a warning.
    #[must_use]
    pub const fn is_skipped(self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl From<tar::EntryType> for EntryKind {
    fn from(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Regular => Self::File,
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink => Self::Symlink,
            tar::EntryType::Link => Self::Hardlink,
            other => Self::Other(other.as_byte()),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "regular file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symbolic link"),
            Self::Hardlink => write!(f, "hard link"),
            Self::Other(b'3') => write!(f, "character device"),
            Self::Other(b'4') => write!(f, "block device"),
            Self::Other(b'6') => write!(f, "fifo"),
            Self::Other(b'7') => write!(f, "contiguous file"),
            Self::Other(b'S') => write!(f, "sparse file"),
            Self::Other(b'g') => write!(f, "pax global header"),
            Self::Other(flag) if flag.is_ascii_graphic() => {
                write!(f, "unknown type '{}'", char::from(*flag))
            }
            Self::Other(flag) => write!(f, "unknown type {flag:#04x}"),
        }
    }
}
