//! apgcheck - validates untrusted APG packages before installation.
//!
//! The package is extracted into a private quarantine directory, its layout
//! and metadata are checked, and the quarantine is removed on every path,
//! including an interrupt.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;
mod quarantine;

use apgcheck_core::ValidationStatus;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let use_colors = !cli.no_color && console::colors_enabled();
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet, use_colors);

    if let Err(err) = logging::init(cli.verbose, use_colors) {
        formatter.format_warning(&format!("{err:#}"));
    }
    if let Err(err) = quarantine::install_interrupt_handler() {
        formatter.format_warning(&format!("{err:#}"));
    }

    match commands::check::execute(&cli, &*formatter) {
        Ok(ValidationStatus::Good) => ExitCode::SUCCESS,
        Ok(ValidationStatus::Bad) => ExitCode::FAILURE,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}
