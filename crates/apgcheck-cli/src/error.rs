//! Error conversion utilities for CLI.
//!
//! Converts apgcheck-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use apgcheck_core::ExtractionError;
use apgcheck_core::QuotaResource;
use std::path::Path;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: ExtractionError, package: &Path) -> anyhow::Error {
    let kind = err.kind();
    match err {
        ExtractionError::PathSecurity { entry, violation } => {
            anyhow!(
                "{kind}: package '{}' contains a rejected entry '{entry}': {violation}\n\
                 HINT: This package may be malicious. Do not install it.",
                package.display(),
            )
        }
        ExtractionError::SizeLimitExceeded {
            entry,
            resource: resource @ QuotaResource::TotalSize { .. },
        } => {
            anyhow!(
                "{kind}: package '{}' stopped at '{entry}': {resource}\n\
                 HINT: Use --max-total-size to raise the limit if the package is trusted.",
                package.display(),
            )
        }
        ExtractionError::SizeLimitExceeded { entry, resource } => {
            anyhow!(
                "{kind}: package '{}' stopped at '{entry}': {resource}",
                package.display(),
            )
        }
        ExtractionError::ArchiveFormat(reason) => {
            anyhow!(
                "{kind}: invalid package '{}': {reason}\n\
                 HINT: An APG package must be a single-stream xz-compressed tar archive.",
                package.display(),
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "{kind} while processing '{}': {io_err}",
                package.display(),
            )
        }
    }
}

/// Adds package context to an extraction result.
pub fn add_package_context<T>(
    result: Result<T, ExtractionError>,
    package: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, package))
}
