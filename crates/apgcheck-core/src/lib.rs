//! Safe extraction and validation of APG package archives.
//!
//! `apgcheck-core` materializes an untrusted, xz-compressed tar package into
//! a quarantine directory without ever writing outside it, then checks the
//! extracted tree for the mandatory layout and a complete `metadata.json`.
//!
//! Every entry name goes through lexical and canonical containment guards
//! before anything is written. Symbolic and hard links are always rejected,
//! device and FIFO entries are skipped, and file sizes are capped.
//!
//! # Examples
//!
//! ```no_run
//! use apgcheck_core::FormatVersion;
//! use apgcheck_core::extract;
//! use apgcheck_core::validate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = extract("hello-1.0.0.apg", "/tmp/apgcheck-quarantine")?;
//! println!("Extracted {} files", report.files_extracted);
//!
//! let result = validate("/tmp/apgcheck-quarantine", FormatVersion::V1);
//! println!("Package is {}", result.status());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
mod copy;
pub mod error;
pub mod extraction;
pub mod report;
pub mod security;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod validation;

// Re-export main API types
pub use api::extract;
pub use api::extract_with;
pub use api::validate;
pub use api::validate_with;
pub use config::SecurityConfig;
pub use error::ExtractionError;
pub use error::PathViolation;
pub use error::QuotaResource;
pub use error::Result;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::EntryKind;
pub use types::SafePath;

pub use validation::FormatVersion;
pub use validation::PackageMetadata;
pub use validation::SchemaError;
pub use validation::StructuralError;
pub use validation::ValidationResult;
pub use validation::ValidationStatus;
