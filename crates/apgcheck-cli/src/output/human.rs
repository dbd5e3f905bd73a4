//! Human-readable output formatter with colors and styling.

use super::formatter::CheckOutcome;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;

/// Printed for a package that passed every check.
pub const SUCCESS_MESSAGE: &str = "The file specified is the correct apg";

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool, use_colors: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors,
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn error_line(&self, label: &str, message: &str) -> String {
        if self.use_colors {
            format!("{} {}", style(format!("{label}:")).red().bold(), style(message).red())
        } else {
            format!("{label}: {message}")
        }
    }

    fn write_summary(&self, outcome: &CheckOutcome<'_>) {
        let report = outcome.extraction;
        let _ = self
            .term
            .write_line(&format!("  Package: {}", outcome.package.display()));
        let _ = self
            .term
            .write_line(&format!("  Format version: {}", outcome.version));
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));
        if report.entries_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries skipped: {}", report.entries_skipped));
        }
        let _ = self
            .term
            .write_line(&format!("  Duration: {:?}", report.duration));
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_check_result(&self, outcome: &CheckOutcome<'_>) -> Result<()> {
        for warning in &outcome.extraction.warnings {
            self.format_warning(warning);
        }

        // Failures are shown even in quiet mode
        if let Some((label, message)) = outcome.failure() {
            self.term.write_line(&self.error_line(label, &message))?;
            if self.verbose {
                self.write_summary(outcome);
            }
            return Ok(());
        }

        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            self.term
                .write_line(&format!("{}", style(SUCCESS_MESSAGE).green().bold()))?;
        } else {
            self.term.write_line(SUCCESS_MESSAGE)?;
        }

        if self.verbose {
            self.write_summary(outcome);
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let _ = self
            .term
            .write_line(&self.error_line("ERROR", &format!("{error:?}")));
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
