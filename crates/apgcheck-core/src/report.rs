//! Extraction operation reporting.

use std::path::Path;
use std::time::Duration;

/// Report of a successful package extraction.
///
/// Contains statistics and the non-fatal warnings raised while streaming
/// the archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of regular files written.
    pub files_extracted: usize,

    /// Number of directory entries materialized.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of entries skipped because their kind is not extracted.
    pub entries_skipped: usize,

    /// Duration of the extraction.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns total number of entries materialized on disk.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Callback trait for progress reporting during extraction.
///
/// The archive is streamed, so the total entry count is unknown up front;
/// callbacks receive the 1-based index of the current entry instead.
///
/// # Examples
///
/// ```
/// use apgcheck_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, current: usize) {
///         println!("Processing #{}: {}", current, path.display());
///     }
///
///     fn on_bytes_written(&mut self, bytes: u64) {}
///
///     fn on_entry_complete(&mut self, path: &Path) {
///         println!("Completed: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {
///         println!("Extraction complete");
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called when starting to process an entry.
    fn on_entry_start(&mut self, path: &Path, current: usize);

    /// Called after each chunk of file data is written.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been completely processed.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called when the end of the archive is reached without errors.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
