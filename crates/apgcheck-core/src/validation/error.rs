//! Validation failure types.

use std::fmt;
use std::io;

use thiserror::Error;

/// Kind a mandatory top-level entry must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
}

impl fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "regular file"),
        }
    }
}

/// A mandatory top-level entry is absent or unusable.
#[derive(Error, Debug)]
pub enum StructuralError {
    /// The entry does not exist.
    #[error("a required file or folder is missing: {entry}")]
    Missing {
        /// Entry name relative to the package root.
        entry: &'static str,
    },

    /// The entry exists with the wrong kind.
    #[error("'{entry}' must be a {expected}")]
    WrongKind {
        /// Entry name relative to the package root.
        entry: &'static str,
        /// Kind the entry should have.
        expected: ExpectedKind,
    },

    /// The entry could not be inspected.
    #[error("cannot inspect '{entry}': {source}")]
    Inaccessible {
        /// Entry name relative to the package root.
        entry: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StructuralError {
    /// Returns the name of the offending entry.
    #[must_use]
    pub const fn entry(&self) -> &'static str {
        match self {
            Self::Missing { entry }
            | Self::WrongKind { entry, .. }
            | Self::Inaccessible { entry, .. } => entry,
        }
    }
}

/// `metadata.json` is unreadable, malformed or incomplete.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The file could not be read.
    #[error("failed to read metadata: {0}")]
    Read(#[source] io::Error),

    /// The file exceeds the metadata size limit.
    #[error("metadata is too large ({size} > {max} bytes)")]
    TooLarge {
        /// Size observed in bytes.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },

    /// The file is not a valid metadata document.
    #[error("metadata is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Required fields are absent or empty.
    #[error("missing or empty fields in metadata: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl SchemaError {
    /// Returns the missing field names, if that is the failure.
    #[must_use]
    pub fn missing_fields(&self) -> Option<&[&'static str]> {
        match self {
            Self::MissingFields(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns `true` for a parse failure.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}
