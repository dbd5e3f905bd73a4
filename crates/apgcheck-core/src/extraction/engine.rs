//! Entry-by-entry extraction loop.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::ExtractionError;
use crate::ExtractionReport;
use crate::PathViolation;
use crate::ProgressCallback;
use crate::Result;
use crate::SecurityConfig;
use crate::copy::CopyBuffer;
use crate::copy::copy_exact;
use crate::security::FILE_MODE;
use crate::security::QuotaTracker;
use crate::security::sanitize_dir_mode;
use crate::types::DestDir;
use crate::types::EntryKind;
use crate::types::SafePath;
use crate::types::safe_path::display_name;

/// Mode for parent directories created implicitly by file entries.
const PARENT_DIR_MODE: u32 = 0o755;

/// Write buffer between the copy loop and the output file.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Materializes the entries of one tar stream under a destination root.
///
/// Entries are processed strictly in stream order. The first rejected entry
/// aborts the run; whatever was written before it stays on disk for the
/// caller to remove.
///
/// # Examples
///
/// ```no_run
/// use apgcheck_core::DestDir;
/// use apgcheck_core::NoopProgress;
/// use apgcheck_core::SecurityConfig;
/// use apgcheck_core::extraction::Extractor;
/// use apgcheck_core::extraction::open_package;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::prepare("/tmp/quarantine")?;
/// let config = SecurityConfig::default();
/// let mut stream = open_package(Path::new("package.apg"))?;
///
/// let report = Extractor::new(&dest, &config).run(&mut stream, &mut NoopProgress)?;
/// println!("{} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub struct Extractor<'a> {
    dest: &'a DestDir,
    config: &'a SecurityConfig,
    quota: QuotaTracker,
    buffer: Box<CopyBuffer>,
    report: ExtractionReport,
}

impl<'a> Extractor<'a> {
    /// Creates an extractor writing under `dest`.
    #[must_use]
    pub fn new(dest: &'a DestDir, config: &'a SecurityConfig) -> Self {
        Self {
            dest,
            config,
            quota: QuotaTracker::new(),
            buffer: Box::default(),
            report: ExtractionReport::new(),
        }
    }

    /// Consumes `archive` until end-of-archive or the first rejection.
    ///
    /// # Errors
    ///
    /// - `ArchiveFormat` for a corrupt compressed stream or tar framing
    /// - `PathSecurity` for a rejected name or a link entry
    /// - `SizeLimitExceeded` for a file over the configured ceiling
    /// - `Io` if the destination cannot be written
    pub fn run<R: Read>(
        mut self,
        archive: &mut tar::Archive<R>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();

        let entries = archive
            .entries()
            .map_err(|e| ExtractionError::stream(e, "failed to read archive"))?;

        for (index, entry) in entries.enumerate() {
            let mut entry =
                entry.map_err(|e| ExtractionError::stream(e, "failed to read entry header"))?;
            self.process_entry(&mut entry, index + 1, progress)?;
        }

        progress.on_complete();
        self.report.duration = start.elapsed();

        debug!(
            files = self.report.files_extracted,
            directories = self.report.directories_created,
            bytes = self.report.bytes_written,
            skipped = self.report.entries_skipped,
            "extraction complete"
        );

        Ok(self.report)
    }

    fn process_entry<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        index: usize,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let raw = entry.path_bytes().into_owned();
        let name = display_name(&raw);
        let kind = EntryKind::from(entry.header().entry_type());

        let safe_path = SafePath::sanitize(&raw, self.dest, self.config)?;
        debug!(entry = %name, %kind, size = entry.size(), "processing entry");

        progress.on_entry_start(safe_path.as_path(), index);

        match kind {
            EntryKind::Directory => self.extract_directory(entry, &safe_path)?,
            EntryKind::File => self.extract_file(entry, &safe_path, &name, progress)?,
            EntryKind::Symlink | EntryKind::Hardlink => {
                return Err(ExtractionError::path(&name, PathViolation::Link { kind }));
            }
            EntryKind::Other(_) => {
                debug!(entry = %name, %kind, "skipping unsupported entry");
                self.report.entries_skipped += 1;
                self.report
                    .add_warning(format!("skipped {kind} entry '{name}'"));
            }
        }

        progress.on_entry_complete(safe_path.as_path());
        Ok(())
    }

    fn extract_directory<R: Read>(
        &mut self,
        entry: &tar::Entry<'_, R>,
        safe_path: &SafePath,
    ) -> Result<()> {
        let mode = entry
            .header()
            .mode()
            .map_err(|e| ExtractionError::stream(e, "invalid entry mode"))?;

        create_directory(&self.dest.join(safe_path), sanitize_dir_mode(mode))?;
        self.report.directories_created += 1;
        Ok(())
    }

    fn extract_file<R: Read>(
        &mut self,
        entry: &mut tar::Entry<'_, R>,
        safe_path: &SafePath,
        name: &str,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let size = entry.size();
        self.quota
            .reserve(size, self.config)
            .map_err(|resource| ExtractionError::SizeLimitExceeded {
                entry: name.to_string(),
                resource,
            })?;

        let output_path = self.dest.join(safe_path);
        if let Some(parent) = output_path.parent() {
            create_directory(parent, PARENT_DIR_MODE)?;
        }

        let file = create_file(&output_path)?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let written = copy_exact(entry, &mut writer, size, &mut self.buffer, |bytes| {
            progress.on_bytes_written(bytes);
        })?;
        writer.flush()?;

        self.report.files_extracted += 1;
        self.report.bytes_written += written;
        Ok(())
    }
}

#[cfg(unix)]
fn create_directory(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_directory(path: &Path, _mode: u32) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Creates or truncates a regular file.
fn create_file(path: &Path) -> io::Result<File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    #[cfg(not(unix))]
    let _ = FILE_MODE;

    options.open(path)
}
