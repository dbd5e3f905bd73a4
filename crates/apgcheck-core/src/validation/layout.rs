//! Mandatory top-level entries of an extracted package.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;

use super::error::ExpectedKind;
use super::error::SchemaError;
use super::error::StructuralError;

/// Name of the payload directory.
pub const DATA_DIR: &str = "data";

/// Name of the checksum list.
pub const MD5SUMS_FILE: &str = "md5sums";

/// Name of the metadata document.
pub const METADATA_FILE: &str = "metadata.json";

/// Mandatory entries, in check order.
pub const REQUIRED_ENTRIES: [(&str, ExpectedKind); 3] = [
    (DATA_DIR, ExpectedKind::Directory),
    (MD5SUMS_FILE, ExpectedKind::File),
    (METADATA_FILE, ExpectedKind::File),
];

/// Checks the mandatory entries under `root`, stopping at the first failure.
///
/// Symlinks are not followed: a symlink named `data` is the wrong kind.
///
/// # Errors
///
/// Returns the first [`StructuralError`] found.
pub fn check_layout(root: &Path) -> Result<(), StructuralError> {
    for (entry, expected) in REQUIRED_ENTRIES {
        let metadata = match fs::symlink_metadata(root.join(entry)) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StructuralError::Missing { entry });
            }
            Err(source) => return Err(StructuralError::Inaccessible { entry, source }),
        };

        let matches = match expected {
            ExpectedKind::Directory => metadata.is_dir(),
            ExpectedKind::File => metadata.is_file(),
        };
        if !matches {
            return Err(StructuralError::WrongKind { entry, expected });
        }
    }
    Ok(())
}

/// Reads `metadata.json` under `root`, refusing files larger than `max`.
///
/// # Errors
///
/// - `SchemaError::Read` if the file cannot be opened or read
/// - `SchemaError::TooLarge` if it exceeds `max` bytes
pub fn read_metadata(root: &Path, max: u64) -> Result<Vec<u8>, SchemaError> {
    let file = File::open(root.join(METADATA_FILE)).map_err(SchemaError::Read)?;

    let declared = file.metadata().map_err(SchemaError::Read)?.len();
    if declared > max {
        return Err(SchemaError::TooLarge {
            size: declared,
            max,
        });
    }

    let mut bytes = Vec::with_capacity(usize::try_from(declared).unwrap_or(0));
    file.take(max.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(SchemaError::Read)?;

    let size = bytes.len() as u64;
    if size > max {
        return Err(SchemaError::TooLarge { size, max });
    }
    Ok(bytes)
}
