//! Check command implementation.

use crate::cli::Cli;
use crate::error::add_package_context;
use crate::output::CheckOutcome;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::quarantine::Quarantine;
use anyhow::Result;
use apgcheck_core::NoopProgress;
use apgcheck_core::SecurityConfig;
use apgcheck_core::ValidationStatus;
use apgcheck_core::extract_with;
use apgcheck_core::validate_with;
use std::io;

/// Extracts and validates the package, then removes the quarantine.
///
/// Returns the verdict for a package that extracted cleanly, or the
/// extraction error. Failing to remove the quarantine is only a warning.
pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<ValidationStatus> {
    let config = SecurityConfig {
        max_total_size: cli.max_total_size,
        ..Default::default()
    };

    let quarantine = Quarantine::create(cli.tmpdir.as_deref())?;
    let result = check_in(cli, &config, &quarantine, formatter);
    finish(result, quarantine.close(), formatter)
}

/// Reports a failed cleanup without changing the check result.
fn finish(
    result: Result<ValidationStatus>,
    cleanup: io::Result<()>,
    formatter: &dyn OutputFormatter,
) -> Result<ValidationStatus> {
    if let Err(err) = cleanup {
        formatter.format_warning(&format!("failed to delete quarantine directory: {err}"));
    }
    result
}

fn check_in(
    cli: &Cli,
    config: &SecurityConfig,
    quarantine: &Quarantine,
    formatter: &dyn OutputFormatter,
) -> Result<ValidationStatus> {
    tracing::debug!(
        package = %cli.apgfile.display(),
        version = %cli.format_version,
        "checking package"
    );

    // Use a spinner if TTY is detected (not quiet, not JSON, is terminal)
    let extraction = if cli.wants_progress() && CliProgress::should_show() {
        let mut progress = CliProgress::new("Extracting");
        extract_with(&cli.apgfile, quarantine.path(), config, &mut progress)
    } else {
        extract_with(&cli.apgfile, quarantine.path(), config, &mut NoopProgress)
    };
    let report = add_package_context(extraction, &cli.apgfile)?;

    let validation = validate_with(quarantine.path(), cli.format_version, config);
    tracing::debug!(status = %validation.status(), "validation finished");

    formatter.format_check_result(&CheckOutcome {
        package: &cli.apgfile,
        version: cli.format_version,
        extraction: &report,
        validation: &validation,
    })?;

    Ok(validation.status())
}
