//! Output formatter trait for CLI results.

use anyhow::Result;
use apgcheck_core::ExtractionReport;
use apgcheck_core::FormatVersion;
use apgcheck_core::ValidationResult;
use serde::Serialize;
use std::path::Path;

/// Everything known about a package that extracted successfully.
pub struct CheckOutcome<'a> {
    pub package: &'a Path,
    pub version: FormatVersion,
    pub extraction: &'a ExtractionReport,
    pub validation: &'a ValidationResult,
}

impl CheckOutcome<'_> {
    /// Returns the failure label and message, or `None` for a good package.
    pub fn failure(&self) -> Option<(&'static str, String)> {
        if let Some(err) = self.validation.structural_error() {
            Some(("structural error", err.to_string()))
        } else {
            self.validation
                .schema_error()
                .map(|err| ("schema error", err.to_string()))
        }
    }
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the verdict for an extracted package
    fn format_check_result(&self, outcome: &CheckOutcome<'_>) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    /// An error that still carries whatever data was gathered.
    pub fn failure(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
