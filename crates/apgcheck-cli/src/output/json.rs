//! JSON output formatter for machine-readable results.
//!
//! Stdout carries exactly one JSON document per run. Warnings that arrive
//! outside a result go to stderr.

use super::formatter::CheckOutcome;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use apgcheck_core::ValidationStatus;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

const OPERATION: &str = "check";

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct CheckData {
    package: String,
    format_version: u8,
    verdict: ValidationVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<&'static str>,
    files_extracted: usize,
    directories_created: usize,
    entries_skipped: usize,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ValidationVerdict {
    Good,
    Bad,
}

impl From<ValidationStatus> for ValidationVerdict {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Good => Self::Good,
            ValidationStatus::Bad => Self::Bad,
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn check_output(outcome: &CheckOutcome<'_>) -> JsonOutput<CheckData> {
        let report = outcome.extraction;
        let metadata = outcome.validation.metadata();
        let data = CheckData {
            package: outcome.package.display().to_string(),
            format_version: outcome.version.as_u8(),
            verdict: outcome.validation.status().into(),
            name: metadata.and_then(|m| m.name.clone()),
            version: metadata.and_then(|m| m.version.clone()),
            missing_fields: outcome
                .validation
                .schema_error()
                .and_then(|e| e.missing_fields())
                .map(<[_]>::to_vec)
                .unwrap_or_default(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        match outcome.failure() {
            Some((label, message)) => {
                JsonOutput::failure(OPERATION, data, format!("{label}: {message}"))
            }
            None => JsonOutput::success(OPERATION, data),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_check_result(&self, outcome: &CheckOutcome<'_>) -> Result<()> {
        Self::output(&Self::check_output(outcome))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error(OPERATION, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let output = JsonOutput::success("warning", WarningData { message });
        if let Ok(json) = serde_json::to_string(&output) {
            let _ = writeln!(io::stderr(), "{json}");
        }
    }
}
