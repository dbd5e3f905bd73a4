//! Outcome of validating an extracted package.

use std::fmt;

use super::error::SchemaError;
use super::error::StructuralError;
use super::metadata::PackageMetadata;

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Layout and metadata are complete.
    Good,
    /// A structural or schema check failed.
    Bad,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Bad => write!(f, "bad"),
        }
    }
}

/// Result of [`validate`](crate::validate).
///
/// At most one of the structural and schema errors is set; the status is
/// `Bad` exactly when one of them is.
#[derive(Debug)]
pub struct ValidationResult {
    status: ValidationStatus,
    structural: Option<StructuralError>,
    schema: Option<SchemaError>,
    metadata: Option<PackageMetadata>,
}

impl ValidationResult {
    pub(crate) const fn good(metadata: PackageMetadata) -> Self {
        Self {
            status: ValidationStatus::Good,
            structural: None,
            schema: None,
            metadata: Some(metadata),
        }
    }

    pub(crate) const fn structural(error: StructuralError) -> Self {
        Self {
            status: ValidationStatus::Bad,
            structural: Some(error),
            schema: None,
            metadata: None,
        }
    }

    pub(crate) const fn schema(error: SchemaError, metadata: Option<PackageMetadata>) -> Self {
        Self {
            status: ValidationStatus::Bad,
            structural: None,
            schema: Some(error),
            metadata,
        }
    }

    /// Returns the verdict.
    #[must_use]
    pub const fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Returns `true` if the package is valid.
    #[must_use]
    pub fn is_good(&self) -> bool {
        self.status == ValidationStatus::Good
    }

    /// Returns the structural error, if any.
    #[must_use]
    pub const fn structural_error(&self) -> Option<&StructuralError> {
        self.structural.as_ref()
    }

    /// Returns the schema error, if any.
    #[must_use]
    pub const fn schema_error(&self) -> Option<&SchemaError> {
        self.schema.as_ref()
    }

    /// Returns the parsed metadata, when parsing got that far.
    #[must_use]
    pub const fn metadata(&self) -> Option<&PackageMetadata> {
        self.metadata.as_ref()
    }
}
