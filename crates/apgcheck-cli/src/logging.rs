//! Tracing subscriber setup.
//!
//! Filtering comes from `APGCHECK_LOG` (same syntax as `RUST_LOG`). Without
//! it, only warnings are shown, or everything down to `debug` with
//! `--verbose`. Logs always go to stderr so stdout carries only the verdict.

use anyhow::Result;
use anyhow::anyhow;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "APGCHECK_LOG";

/// Installs the global subscriber.
pub fn init(verbose: bool, use_colors: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(use_colors)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}

const fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}
