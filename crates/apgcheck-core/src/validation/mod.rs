//! Post-extraction validation of a package tree.
//!
//! Checks run in two short-circuiting phases: the top-level layout, then
//! `metadata.json` against the required-field schema of the selected
//! format version. Within the schema phase every missing field is reported.

pub mod error;
pub mod layout;
pub mod metadata;
pub mod result;
pub mod schema;

use std::path::Path;

use tracing::debug;

use crate::SecurityConfig;

pub use error::ExpectedKind;
pub use error::SchemaError;
pub use error::StructuralError;
pub use metadata::FieldValue;
pub use metadata::PackageMetadata;
pub use result::ValidationResult;
pub use result::ValidationStatus;
pub use schema::FieldKind;
pub use schema::FormatVersion;
pub use schema::RequiredField;
pub use schema::UnknownFormatVersion;

/// Validates the extracted package rooted at `root`.
pub fn validate_package(
    root: &Path,
    version: FormatVersion,
    config: &SecurityConfig,
) -> ValidationResult {
    if let Err(error) = layout::check_layout(root) {
        debug!(%error, "layout check failed");
        return ValidationResult::structural(error);
    }

    let bytes = match layout::read_metadata(root, config.max_metadata_size) {
        Ok(bytes) => bytes,
        Err(error) => return ValidationResult::schema(error, None),
    };

    let metadata = match PackageMetadata::from_slice(&bytes) {
        Ok(metadata) => metadata,
        Err(error) => return ValidationResult::schema(SchemaError::Parse(error), None),
    };

    let missing = metadata.missing_fields(version);
    if missing.is_empty() {
        debug!(%version, "metadata complete");
        ValidationResult::good(metadata)
    } else {
        debug!(%version, ?missing, "metadata incomplete");
        ValidationResult::schema(SchemaError::MissingFields(missing), Some(metadata))
    }
}
