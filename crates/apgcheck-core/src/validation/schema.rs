//! Required-field schema per package format version.
//!
//! Both versions share one descriptor: an ordered list of field names with
//! their kind. Version 2 appends three fields to version 1.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Package metadata format version.
///
/// # Examples
///
/// ```
/// use apgcheck_core::FormatVersion;
///
/// let version: FormatVersion = "2".parse().unwrap();
/// assert_eq!(version, FormatVersion::V2);
/// assert_eq!(FormatVersion::try_from(1u8).unwrap(), FormatVersion::V1);
/// assert!("3".parse::<FormatVersion>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatVersion {
    /// Original layout.
    #[default]
    V1,
    /// Adds `type`, `tags` and `conf`.
    V2,
}

/// Error returned for an unknown format version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported format version '{0}' (expected 1 or 2)")]
pub struct UnknownFormatVersion(pub String);

impl FormatVersion {
    /// Returns the numeric version.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Returns the required fields for this version, in check order.
    pub fn required_fields(self) -> impl Iterator<Item = &'static RequiredField> {
        let extra: &'static [RequiredField] = match self {
            Self::V1 => &[],
            Self::V2 => &V2_EXTRA_FIELDS,
        };
        V1_FIELDS.iter().chain(extra)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl TryFrom<u8> for FormatVersion {
    type Error = UnknownFormatVersion;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(UnknownFormatVersion(other.to_string())),
        }
    }
}

impl FromStr for FormatVersion {
    type Err = UnknownFormatVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            other => Err(UnknownFormatVersion(other.to_string())),
        }
    }
}

/// How a required field is judged missing.
///
/// A scalar is missing when absent, `null` or the empty string. A list is
/// missing only when absent or `null`; an empty list counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String field.
    Scalar,
    /// List-of-strings field.
    List,
}

/// One entry of the required-field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredField {
    /// JSON key in `metadata.json`.
    pub name: &'static str,
    /// Scalar or list.
    pub kind: FieldKind,
}

impl RequiredField {
    const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Scalar,
        }
    }

    const fn list(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List,
        }
    }
}

static V1_FIELDS: [RequiredField; 9] = [
    RequiredField::scalar("name"),
    RequiredField::scalar("version"),
    RequiredField::scalar("description"),
    RequiredField::scalar("maintainer"),
    RequiredField::scalar("homepage"),
    RequiredField::list("dependencies"),
    RequiredField::list("conflicts"),
    RequiredField::list("provides"),
    RequiredField::list("replaces"),
];

static V2_EXTRA_FIELDS: [RequiredField; 3] = [
    RequiredField::scalar("type"),
    RequiredField::list("tags"),
    RequiredField::list("conf"),
];
