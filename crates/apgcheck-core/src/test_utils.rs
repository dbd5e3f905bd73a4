//! Test utilities for building package archives.
//!
//! [`PackageBuilder`] produces in-memory tar streams (plain or xz-compressed),
//! including entries the `tar` builder itself refuses to write, such as
//! absolute names or `..` segments.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;
use xz2::write::XzEncoder;

/// Length of the name field in a classic tar header.
const HEADER_NAME_LEN: usize = 100;

/// Returns `metadata.json` content with every v1 field populated.
///
/// List fields are present but empty.
#[must_use]
pub fn metadata_v1() -> Value {
    json!({
        "name": "hello",
        "version": "1.0.0",
        "description": "Prints a friendly greeting",
        "maintainer": "Jane Doe <jane@example.org>",
        "homepage": "https://example.org/hello",
        "dependencies": [],
        "conflicts": [],
        "provides": [],
        "replaces": [],
        "architecture": "amd64",
        "license": "MIT"
    })
}

/// Returns `metadata.json` content with every v2 field populated.
#[must_use]
pub fn metadata_v2() -> Value {
    let mut value = metadata_v1();
    let object = value.as_object_mut().unwrap();
    object.insert("type".into(), json!("app"));
    object.insert("tags".into(), json!(["cli", "demo"]));
    object.insert("conf".into(), json!(["/etc/hello.conf"]));
    value
}

/// Writes `bytes` to `dir/name` and returns the full path.
pub fn write_package(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// Builder for package archives with arbitrary entries.
///
/// # Examples
///
/// ```
/// use apgcheck_core::test_utils::PackageBuilder;
/// use apgcheck_core::test_utils::metadata_v1;
///
/// let apg = PackageBuilder::new()
///     .add_directory("data/")
///     .add_file("md5sums", b"")
///     .add_metadata(&metadata_v1())
///     .build();
/// assert!(!apg.is_empty());
///
/// let evil = PackageBuilder::new()
///     .add_raw_file(b"../../etc/cron.d/evil", b"* * * * * root sh")
///     .build();
/// assert!(!evil.is_empty());
/// ```
pub struct PackageBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl PackageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Starts a well-formed package: `data/`, `md5sums` and `metadata.json`.
    #[must_use]
    pub fn valid(metadata: &Value) -> Self {
        Self::new()
            .add_directory("data/")
            .add_file("md5sums", b"d41d8cd98f00b204e9800998ecf8427e  data/empty\n")
            .add_metadata(metadata)
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom header mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds `metadata.json` serialized from `value`.
    #[must_use]
    pub fn add_metadata(self, value: &Value) -> Self {
        let bytes = serde_json::to_vec_pretty(value).unwrap();
        self.add_file("metadata.json", &bytes)
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        self.add_directory_with_mode(path, 0o755)
    }

    /// Adds a directory with a custom header mode.
    #[must_use]
    pub fn add_directory_with_mode(mut self, path: &str, mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(mode);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symbolic link.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Symlink)
    }

    /// Adds a hard link.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Link)
    }

    fn add_link(mut self, path: &str, target: &str, entry_type: tar::EntryType) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(entry_type);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a FIFO entry.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Fifo);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a regular file whose name bytes are written verbatim.
    ///
    /// Names that fit the classic header go into its name field; longer
    /// names or names with a NUL byte are carried in a PAX `path` record.
    #[must_use]
    pub fn add_raw_file(self, name: &[u8], data: &[u8]) -> Self {
        self.add_raw_entry(name, tar::EntryType::Regular, data.len() as u64, data)
    }

    /// Adds a regular file header declaring `size` bytes, followed by `data`.
    ///
    /// `data` may be shorter than `size`, which lets size-guard tests declare
    /// huge entries without producing the payload.
    #[must_use]
    pub fn add_raw_file_with_size(self, name: &[u8], size: u64, data: &[u8]) -> Self {
        self.add_raw_entry(name, tar::EntryType::Regular, size, data)
    }

    /// Adds a symbolic link with verbatim name and target bytes.
    #[must_use]
    pub fn add_raw_symlink(mut self, name: &[u8], target: &[u8]) -> Self {
        let mut header = raw_header(name, tar::EntryType::Symlink, 0);
        header.as_old_mut().linkname[..target.len()].copy_from_slice(target);
        header.set_cksum();
        self.builder.append(&header, std::io::empty()).unwrap();
        self
    }

    fn add_raw_entry(
        mut self,
        name: &[u8],
        entry_type: tar::EntryType,
        size: u64,
        data: &[u8],
    ) -> Self {
        if name.len() <= HEADER_NAME_LEN && !name.contains(&0) {
            let mut header = raw_header(name, entry_type, size);
            header.set_cksum();
            self.builder.append(&header, data).unwrap();
        } else {
            self.builder
                .append_pax_extensions([("path", name)])
                .unwrap();
            let mut header = raw_header(b"pax-placeholder", entry_type, size);
            header.set_cksum();
            self.builder.append(&header, data).unwrap();
        }
        self
    }

    /// Returns the uncompressed tar stream.
    #[must_use]
    pub fn build_tar(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Returns the xz-compressed tar stream.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        xz_compress(&self.build_tar())
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn raw_header(name: &[u8], entry_type: tar::EntryType, size: u64) -> tar::Header {
    let mut header = tar::Header::new_old();
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(0o644);
    header
}

/// Compresses `bytes` as a single xz stream.
#[must_use]
pub fn xz_compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}
