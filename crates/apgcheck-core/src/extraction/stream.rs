//! Opening a package as a decompressing tar stream.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;

use xz2::read::XzDecoder;

use crate::ExtractionError;
use crate::Result;

/// Buffer size between the archive file and the xz decoder.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Tar reader over a single-stream xz decoder.
pub type PackageStream<R> = tar::Archive<XzDecoder<R>>;

/// Opens `path` as a package stream.
///
/// Nothing is decompressed here; a bad xz header surfaces from the first
/// entry read as `ArchiveFormat`.
///
/// # Errors
///
/// Returns `ExtractionError::Io` if the archive cannot be opened.
pub fn open_package(path: &Path) -> Result<PackageStream<BufReader<File>>> {
    let file = File::open(path).map_err(|e| {
        ExtractionError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot open archive {}: {e}", path.display()),
        ))
    })?;

    Ok(package_stream(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
}

/// Wraps any reader of xz-compressed bytes.
///
/// Only the first xz stream is decoded; concatenated streams are not
/// followed.
pub fn package_stream<R: Read>(reader: R) -> PackageStream<R> {
    tar::Archive::new(XzDecoder::new(reader))
}
