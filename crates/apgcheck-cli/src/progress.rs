//! Progress spinner for extraction.

use apgcheck_core::ProgressCallback;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;

/// Spinner implementing `ProgressCallback`.
///
/// The entry count of a package is unknown until the stream ends, so this
/// shows the current entry and the bytes written so far instead of a bar.
/// Drawn on stderr and cleared when done.
pub struct CliProgress {
    bar: ProgressBar,
    current: String,
    bytes_written: u64,
}

impl CliProgress {
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        // "⠋ Extracting [12] data/usr/bin/hello (15.2 MB)"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {prefix} [{pos}] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            current: String::new(),
            bytes_written: 0,
        }
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "{} ({})",
            self.current,
            humanize_bytes(self.bytes_written)
        ));
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, path: &Path, current: usize) {
        self.bar.set_position(current as u64);
        self.current = path.display().to_string();
        self.refresh();
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written = self.bytes_written.saturating_add(bytes);
        self.refresh();
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        self.bar.tick();
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
