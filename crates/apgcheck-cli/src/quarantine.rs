//! Scratch directory a package is extracted into.
//!
//! The path of the live quarantine is also registered process-wide, so the
//! interrupt handler can remove it when SIGINT, SIGTERM or SIGHUP stops a
//! check before the guard runs.

use anyhow::Context;
use anyhow::Result;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// Prefix of every quarantine directory name.
pub const PREFIX: &str = "apgcheck-";

/// Exit status after an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Attempts made to remove a quarantine the extractor is still writing to.
const REMOVAL_ATTEMPTS: usize = 10;

static ACTIVE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// A uniquely named, empty directory owned for one check.
///
/// [`close`](Self::close) removes it and reports failures. If the guard is
/// dropped instead (early return, unwinding panic), removal still happens
/// but errors are lost.
pub struct Quarantine {
    registration: Registration,
    dir: TempDir,
}

impl Quarantine {
    /// Creates the directory under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);

        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent).with_context(|| {
                format!("failed to create quarantine directory in '{}'", parent.display())
            })?,
            None => builder
                .tempdir()
                .context("failed to create quarantine directory")?,
        };

        tracing::debug!(path = %dir.path().display(), "created quarantine directory");
        Ok(Self {
            registration: Registration::new(dir.path()),
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory and everything extracted into it.
    pub fn close(self) -> io::Result<()> {
        let Self { registration, dir } = self;
        dir.close()?;
        tracing::debug!(path = %registration.path.display(), "removed quarantine directory");
        Ok(())
    }
}

/// Keeps the quarantine path visible to the interrupt handler while alive.
struct Registration {
    path: PathBuf,
}

impl Registration {
    fn new(path: &Path) -> Self {
        *lock_active() = Some(path.to_path_buf());
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut active = lock_active();
        if active.as_ref() == Some(&self.path) {
            active.take();
        }
    }
}

fn lock_active() -> std::sync::MutexGuard<'static, Option<PathBuf>> {
    ACTIVE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes the registered quarantine, if any.
///
/// The extraction thread keeps running while this executes and may recreate
/// entries, so removal is retried until the path is gone.
fn remove_active() -> Option<PathBuf> {
    let path = lock_active().take()?;
    for _ in 0..REMOVAL_ATTEMPTS {
        match fs::remove_dir_all(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {}
            _ if !path.exists() => break,
            _ => {}
        }
        thread::sleep(Duration::from_millis(10));
    }
    Some(path)
}

/// Installs the handler that removes the quarantine and exits on SIGINT,
/// SIGTERM or SIGHUP.
pub fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        if let Some(path) = remove_active() {
            tracing::warn!(path = %path.display(), "interrupted, removed quarantine directory");
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("failed to install interrupt handler")
}
