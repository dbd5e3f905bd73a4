//! Error types for package extraction.
//!
//! Validation failures are not errors in this sense: they are reported
//! through [`ValidationResult`](crate::ValidationResult), whose structural
//! and schema errors live in [`crate::validation`].

use std::io;

use thiserror::Error;

use crate::types::EntryKind;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Represents a specific size limit that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// Single file size limit exceeded.
    FileSize {
        /// Declared file size in bytes.
        size: u64,
        /// Maximum allowed file size in bytes.
        max: u64,
    },
    /// Aggregate extracted size limit exceeded.
    TotalSize {
        /// Total size in bytes including the offending entry.
        current: u64,
        /// Maximum allowed total size in bytes.
        max: u64,
    },
    /// Integer overflow detected in size accounting.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileSize { size, max } => {
                write!(f, "single file size ({size} > {max} bytes)")
            }
            Self::TotalSize { current, max } => {
                write!(f, "total extracted size ({current} > {max} bytes)")
            }
            Self::IntegerOverflow => write!(f, "integer overflow in size accounting"),
        }
    }
}

/// Reason an entry name or entry kind was rejected by the path guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathViolation {
    /// The name is an absolute path.
    Absolute,
    /// The name contains a `..` segment.
    Traversal,
    /// The cleaned name is longer than the configured maximum.
    TooLong {
        /// Length of the cleaned name in bytes.
        len: usize,
        /// Maximum allowed length in bytes.
        max: usize,
    },
    /// The name contains a NUL byte.
    NulByte,
    /// The canonical target does not resolve inside the destination root.
    OutsideDestination,
    /// Link entries are never extracted.
    Link {
        /// Symlink or hard link.
        kind: EntryKind,
    },
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute => write!(f, "absolute path"),
            Self::Traversal => write!(f, "path traversal attempt"),
            Self::TooLong { len, max } => write!(f, "path too long ({len} > {max} bytes)"),
            Self::NulByte => write!(f, "path contains NUL byte"),
            Self::OutsideDestination => write!(f, "target resolves outside destination"),
            Self::Link { kind } => write!(f, "{kind} entries are not allowed"),
        }
    }
}

/// Errors that can occur while extracting a package archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed (archive unreadable, destination unwritable).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Compression stream or tar framing is invalid.
    #[error("invalid archive: {0}")]
    ArchiveFormat(String),

    /// An entry was rejected by the path guards.
    #[error("path security violation in '{entry}': {violation}")]
    PathSecurity {
        /// Entry name as declared in the archive.
        entry: String,
        /// Why it was rejected.
        violation: PathViolation,
    },

    /// An entry exceeded a size limit.
    #[error("size limit exceeded for '{entry}': {resource}")]
    SizeLimitExceeded {
        /// Entry name as declared in the archive.
        entry: String,
        /// The limit that was exceeded.
        resource: QuotaResource,
    },
}

impl ExtractionError {
    /// Builds a path security error for `entry`.
    pub(crate) fn path(entry: &str, violation: PathViolation) -> Self {
        Self::PathSecurity {
            entry: entry.to_string(),
            violation,
        }
    }

    /// Classifies an error raised while reading the decompressed tar stream.
    ///
    /// The xz decoder and the tar reader both surface malformed input as
    /// `io::Error`; those kinds become `ArchiveFormat`, anything else stays
    /// an I/O error.
    pub(crate) fn stream(err: io::Error, context: &str) -> Self {
        match err.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Other => Self::ArchiveFormat(format!("{context}: {err}")),
            _ => Self::Io(io::Error::new(err.kind(), format!("{context}: {err}"))),
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use apgcheck_core::ExtractionError;
    /// use apgcheck_core::PathViolation;
    ///
    /// let err = ExtractionError::PathSecurity {
    ///     entry: "../etc/passwd".to_string(),
    ///     violation: PathViolation::Traversal,
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = ExtractionError::ArchiveFormat("bad header".to_string());
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathSecurity { .. } | Self::SizeLimitExceeded { .. }
        )
    }

    /// Returns a short name for the error category.
    ///
    /// ```
    /// use apgcheck_core::ExtractionError;
    ///
    /// let err = ExtractionError::ArchiveFormat("bad magic".to_string());
    /// assert_eq!(err.kind(), "archive format error");
    /// ```
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "I/O error",
            Self::ArchiveFormat(_) => "archive format error",
            Self::PathSecurity { .. } => "path security violation",
            Self::SizeLimitExceeded { .. } => "size limit exceeded",
        }
    }

    /// Returns the offending entry name, if the error is tied to one.
    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::PathSecurity { entry, .. } | Self::SizeLimitExceeded { entry, .. } => {
                Some(entry)
            }
            _ => None,
        }
    }

    /// Returns the path violation, if applicable.
    #[must_use]
    pub const fn violation(&self) -> Option<&PathViolation> {
        match self {
            Self::PathSecurity { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// Returns the size limit that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::SizeLimitExceeded { resource, .. } => Some(resource),
            _ => None,
        }
    }
}
