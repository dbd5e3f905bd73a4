//! Bounded entry copy with a reusable buffer.
//!
//! File data is streamed from the tar entry to disk one chunk at a time; no
//! entry is ever held fully in memory.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use crate::ExtractionError;

/// Buffer size for copy operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable buffer for entry copies.
///
/// One buffer is allocated per extraction and shared by every regular-file
/// entry in the archive.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zero-initialized copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies exactly `expected` bytes from `reader` to `writer`.
///
/// Reads never go past `expected` bytes. `on_chunk` is invoked with the size
/// of every chunk written.
///
/// # Errors
///
/// - `ArchiveFormat` if the reader reports malformed data or ends before
///   `expected` bytes were produced
/// - `Io` if writing fails
pub fn copy_exact<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    expected: u64,
    buffer: &mut CopyBuffer,
    mut on_chunk: F,
) -> Result<u64, ExtractionError>
where
    R: Read,
    W: Write,
    F: FnMut(u64),
{
    let mut limited = reader.take(expected);
    let mut total: u64 = 0;

    loop {
        let bytes_read = match limited.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractionError::stream(e, "failed to read entry data")),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(ExtractionError::Io)?;

        // bounded by `take(expected)`, cannot overflow
        total += bytes_read as u64;
        on_chunk(bytes_read as u64);
    }

    if total != expected {
        return Err(ExtractionError::ArchiveFormat(format!(
            "entry data truncated: expected {expected} bytes, got {total}"
        )));
    }

    Ok(total)
}
