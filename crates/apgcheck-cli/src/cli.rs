//! CLI argument parsing using clap.

use apgcheck_core::FormatVersion;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apgcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the APG package to check
    #[arg(short = 'a', long, value_name = "FILE")]
    pub apgfile: PathBuf,

    /// Metadata format version to validate against (1 or 2)
    #[arg(short = 'f', long, value_name = "VERSION", default_value = "1")]
    pub format_version: FormatVersion,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory to create the quarantine directory in (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub tmpdir: Option<PathBuf>,

    /// Maximum total extracted size (e.g. 512M, 2G); unlimited by default
    #[arg(long, value_name = "SIZE", value_parser = parse_byte_size)]
    pub max_total_size: Option<u64>,
}

impl Cli {
    /// Returns `true` when a progress spinner may be drawn.
    pub const fn wants_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
