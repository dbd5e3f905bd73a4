//! High-level public API for package extraction and validation.

use std::path::Path;

use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::SecurityConfig;
use crate::extraction::Extractor;
use crate::extraction::open_package;
use crate::types::DestDir;
use crate::validation::FormatVersion;
use crate::validation::ValidationResult;
use crate::validation::validate_package;

/// Extracts a package archive into `destination` with the default limits.
///
/// See [`extract_with`] for the full contract.
///
/// # Errors
///
/// Returns the first error that stopped the extraction.
///
/// # Examples
///
/// ```no_run
/// use apgcheck_core::extract;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract("hello-1.0.0.apg", "/tmp/apgcheck-quarantine")?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    destination: Q,
) -> Result<ExtractionReport> {
    extract_with(
        archive_path,
        destination,
        &SecurityConfig::default(),
        &mut NoopProgress,
    )
}

/// Extracts a package archive into `destination`.
///
/// The destination is created if missing and must otherwise be an empty
/// directory. Extraction is all-or-nothing in outcome but not on disk: on
/// failure, entries written before the rejected one are left in place and
/// the caller owns their removal.
///
/// # Errors
///
/// Returns an error if:
/// - the archive cannot be opened, or the destination cannot be prepared
///   (`Io`)
/// - the xz stream or tar framing is corrupt (`ArchiveFormat`)
/// - an entry name fails a path guard, or the entry is a link
///   (`PathSecurity`)
/// - a file exceeds a size limit (`SizeLimitExceeded`)
/// - writing to the destination fails (`Io`)
pub fn extract_with<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    destination: Q,
    config: &SecurityConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut stream = open_package(archive_path.as_ref())?;
    let dest = DestDir::prepare(destination)?;
    Extractor::new(&dest, config).run(&mut stream, progress)
}

/// Validates an extracted package tree with the default limits.
///
/// # Examples
///
/// ```no_run
/// use apgcheck_core::FormatVersion;
/// use apgcheck_core::validate;
///
/// let result = validate("/tmp/apgcheck-quarantine", FormatVersion::V1);
/// if let Some(error) = result.schema_error() {
///     eprintln!("{error}");
/// }
/// ```
pub fn validate<P: AsRef<Path>>(destination: P, version: FormatVersion) -> ValidationResult {
    validate_with(destination, version, &SecurityConfig::default())
}

/// Validates an extracted package tree.
///
/// Failures are reported through the returned [`ValidationResult`], never as
/// an `Err`.
pub fn validate_with<P: AsRef<Path>>(
    destination: P,
    version: FormatVersion,
    config: &SecurityConfig,
) -> ValidationResult {
    validate_package(destination.as_ref(), version, config)
}
