//! Integration tests for apgcheck-core.
//!
//! These tests drive `extract` and `validate` end to end against real
//! xz-compressed packages and a real filesystem.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use apgcheck_core::EntryKind;
use apgcheck_core::ExtractionError;
use apgcheck_core::FormatVersion;
use apgcheck_core::PathViolation;
use apgcheck_core::QuotaResource;
use apgcheck_core::SchemaError;
use apgcheck_core::StructuralError;
use apgcheck_core::extract;
use apgcheck_core::test_utils::PackageBuilder;
use apgcheck_core::test_utils::metadata_v1;
use apgcheck_core::test_utils::metadata_v2;
use apgcheck_core::test_utils::write_package;
use apgcheck_core::test_utils::xz_compress;
use apgcheck_core::validate;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Workspace with the package file and a not-yet-created destination.
struct Fixture {
    temp: TempDir,
    apg: PathBuf,
    dest: PathBuf,
}

impl Fixture {
    fn new(package: &[u8]) -> Self {
        let temp = TempDir::new().unwrap();
        let apg = write_package(temp.path(), "package.apg", package);
        let dest = temp.path().join("quarantine");
        Self { temp, apg, dest }
    }

    fn extract(&self) -> apgcheck_core::Result<apgcheck_core::ExtractionReport> {
        extract(&self.apg, &self.dest)
    }

    /// Names of everything in the workspace besides the package and the
    /// destination.
    fn strays(&self) -> Vec<PathBuf> {
        fs::read_dir(self.temp.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| *p != self.apg && *p != self.dest)
            .collect()
    }
}

fn tree(root: &Path) -> Vec<(PathBuf, Option<Vec<u8>>)> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            let content = entry
                .file_type()
                .is_file()
                .then(|| fs::read(entry.path()).unwrap());
            (relative, content)
        })
        .collect()
}

/// Bytes that xz cannot shrink much.
fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9e37_79b9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[0]
        })
        .collect()
}

#[test]
fn test_traversal_names_rejected_and_nothing_written_after() {
    let names: [&[u8]; 6] = [
        b"../escape.txt",
        b"..",
        b"data/../../escape.txt",
        b"data/../metadata.json",
        b"./../escape.txt",
        b"data/sub/../../../escape.txt",
    ];

    for name in names {
        let fixture = Fixture::new(
            &PackageBuilder::new()
                .add_directory("data/")
                .add_raw_file(name, b"pwned")
                .add_file("md5sums", b"")
                .build(),
        );

        let err = fixture.extract().unwrap_err();
        assert_eq!(
            err.violation(),
            Some(&PathViolation::Traversal),
            "{}",
            String::from_utf8_lossy(name)
        );
        assert!(fixture.dest.join("data").is_dir());
        assert!(!fixture.dest.join("md5sums").exists());
        assert!(!fixture.dest.join("metadata.json").exists());
        assert!(fixture.strays().is_empty(), "{:?}", fixture.strays());
    }
}

#[test]
fn test_absolute_name_rejected() {
    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_raw_file(b"/tmp/apgcheck-absolute-escape", b"pwned")
            .build(),
    );

    let err = fixture.extract().unwrap_err();
    assert_eq!(err.violation(), Some(&PathViolation::Absolute));
    assert_eq!(err.entry(), Some("/tmp/apgcheck-absolute-escape"));
    assert!(!Path::new("/tmp/apgcheck-absolute-escape").exists());
}

#[test]
fn test_long_and_nul_names_rejected() {
    let long = format!("data/{}", "x".repeat(251));
    let fixture = Fixture::new(&PackageBuilder::new().add_file(&long, b"x").build());
    assert!(matches!(
        fixture.extract().unwrap_err().violation(),
        Some(PathViolation::TooLong { len: 256, max: 255 })
    ));

    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_raw_file(b"data/evil\0.txt", b"x")
            .build(),
    );
    assert_eq!(
        fixture.extract().unwrap_err().violation(),
        Some(&PathViolation::NulByte)
    );
}

#[test]
fn test_links_rejected_regardless_of_target() {
    for target in ["/etc/passwd", "../../outside", "md5sums", "data/file"] {
        let fixture = Fixture::new(
            &PackageBuilder::valid(&metadata_v1())
                .add_symlink("data/link", target)
                .build(),
        );
        let err = fixture.extract().unwrap_err();
        assert_eq!(
            err.violation(),
            Some(&PathViolation::Link {
                kind: EntryKind::Symlink
            }),
            "target {target}"
        );
        assert!(fs::symlink_metadata(fixture.dest.join("data/link")).is_err());

        let fixture = Fixture::new(
            &PackageBuilder::valid(&metadata_v1())
                .add_hardlink("data/link", target)
                .build(),
        );
        assert_eq!(
            fixture.extract().unwrap_err().violation(),
            Some(&PathViolation::Link {
                kind: EntryKind::Hardlink
            })
        );
    }
}

#[test]
fn test_declared_size_over_ceiling_rejected_before_write() {
    let over = 500 * 1024 * 1024 + 1;
    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_directory("data/")
            .add_raw_file_with_size(b"data/huge.bin", over, b"")
            .build(),
    );

    let err = fixture.extract().unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::SizeLimitExceeded {
            ref entry,
            resource: QuotaResource::FileSize { size, max },
        } if entry == "data/huge.bin" && size == over && max == over - 1
    ));
    assert!(!fixture.dest.join("data/huge.bin").exists());
}

#[test]
fn test_valid_v1_package() {
    let fixture = Fixture::new(&PackageBuilder::valid(&metadata_v1()).build());

    let report = fixture.extract().unwrap();
    assert_eq!(report.files_extracted, 2);
    assert_eq!(report.directories_created, 1);
    assert!(!report.has_warnings());

    let result = validate(&fixture.dest, FormatVersion::V1);
    assert!(result.is_good(), "{result:?}");
    assert_eq!(
        result.metadata().and_then(|m| m.name.as_deref()),
        Some("hello")
    );
}

#[test]
fn test_valid_v2_package() {
    let fixture = Fixture::new(&PackageBuilder::valid(&metadata_v2()).build());
    fixture.extract().unwrap();

    assert!(validate(&fixture.dest, FormatVersion::V2).is_good());
    assert!(validate(&fixture.dest, FormatVersion::V1).is_good());
}

#[test]
fn test_absent_dependencies_reported() {
    let mut metadata = metadata_v1();
    metadata.as_object_mut().unwrap().remove("dependencies");
    metadata["version"] = serde_json::json!("");
    let fixture = Fixture::new(&PackageBuilder::valid(&metadata).build());
    fixture.extract().unwrap();

    let result = validate(&fixture.dest, FormatVersion::V1);
    assert!(!result.is_good());
    let missing = result.schema_error().and_then(SchemaError::missing_fields);
    assert_eq!(missing, Some(&["version", "dependencies"][..]));
}

#[test]
fn test_empty_dependency_list_is_present() {
    let fixture = Fixture::new(&PackageBuilder::valid(&metadata_v1()).build());
    fixture.extract().unwrap();

    let metadata = fs::read_to_string(fixture.dest.join("metadata.json")).unwrap();
    assert!(metadata.contains("\"dependencies\": []"));
    assert!(validate(&fixture.dest, FormatVersion::V1).is_good());
}

#[test]
fn test_invalid_json_is_parse_error() {
    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_directory("data/")
            .add_file("md5sums", b"")
            .add_file("metadata.json", b"{ \"name\": \"hello\", ")
            .build(),
    );
    fixture.extract().unwrap();

    let result = validate(&fixture.dest, FormatVersion::V1);
    let error = result.schema_error().unwrap();
    assert!(error.is_parse_error());
    assert!(error.missing_fields().is_none());
    assert!(result.metadata().is_none());
}

#[test]
fn test_null_metadata_reports_every_field() {
    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_directory("data/")
            .add_file("md5sums", b"")
            .add_file("metadata.json", b"null\n")
            .build(),
    );
    fixture.extract().unwrap();

    let result = validate(&fixture.dest, FormatVersion::V1);
    let error = result.schema_error().unwrap();
    assert!(!error.is_parse_error());
    assert_eq!(
        error.missing_fields().unwrap(),
        [
            "name",
            "version",
            "description",
            "maintainer",
            "homepage",
            "dependencies",
            "conflicts",
            "provides",
            "replaces",
        ]
    );
}

#[test]
fn test_missing_layout_entry_short_circuits() {
    let fixture = Fixture::new(
        &PackageBuilder::new()
            .add_directory("data/")
            .add_file("metadata.json", b"not even json")
            .build(),
    );
    fixture.extract().unwrap();

    let result = validate(&fixture.dest, FormatVersion::V1);
    assert!(matches!(
        result.structural_error(),
        Some(StructuralError::Missing { entry: "md5sums" })
    ));
    assert!(result.schema_error().is_none());
}

#[test]
fn test_extraction_is_idempotent() {
    let package = PackageBuilder::valid(&metadata_v2())
        .add_directory("data/usr/bin/")
        .add_file("data/usr/bin/hello", b"#!/bin/sh\necho hello\n")
        .add_file("data/usr/share/doc/hello/README", &noise(100_000))
        .add_file("data/empty", b"")
        .build();
    let first = Fixture::new(&package);
    let second = Fixture::new(&package);

    first.extract().unwrap();
    second.extract().unwrap();

    let first_tree = tree(&first.dest);
    assert_eq!(first_tree.len(), 11);
    assert_eq!(first_tree, tree(&second.dest));
}

#[test]
fn test_every_extracted_path_is_contained() {
    let fixture = Fixture::new(
        &PackageBuilder::valid(&metadata_v1())
            .add_raw_file(b"./data//a/./b/c.txt", b"c")
            .add_directory("data/x/y/")
            .add_raw_file(b"data/x/y/./z.txt", b"z")
            .build(),
    );
    fixture.extract().unwrap();

    let root = fixture.dest.canonicalize().unwrap();
    let mut count = 0;
    for entry in WalkDir::new(&root).min_depth(1) {
        let entry = entry.unwrap();
        assert!(!entry.path_is_symlink());
        let canonical = entry.path().canonicalize().unwrap();
        assert!(
            canonical.starts_with(&root),
            "{} escapes {}",
            canonical.display(),
            root.display()
        );
        count += 1;
    }
    assert!(count >= 9);
    assert_eq!(fs::read(root.join("data/a/b/c.txt")).unwrap(), b"c");
}

#[test]
fn test_special_entries_skipped_with_warning() {
    let fixture = Fixture::new(
        &PackageBuilder::valid(&metadata_v1())
            .add_fifo("data/pipe")
            .build(),
    );

    let report = fixture.extract().unwrap();
    assert_eq!(report.entries_skipped, 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(!fixture.dest.join("data/pipe").exists());
    assert!(validate(&fixture.dest, FormatVersion::V1).is_good());
}

#[test]
fn test_not_xz_is_format_error() {
    let plain_tar = PackageBuilder::valid(&metadata_v1()).build_tar();
    let fixture = Fixture::new(&plain_tar);
    assert!(matches!(
        fixture.extract(),
        Err(ExtractionError::ArchiveFormat(_))
    ));
}

#[test]
fn test_truncated_stream_is_format_error() {
    let package = PackageBuilder::new()
        .add_file("data/blob", &noise(256 * 1024))
        .build();
    let fixture = Fixture::new(&package[..package.len() / 2]);

    assert!(matches!(
        fixture.extract(),
        Err(ExtractionError::ArchiveFormat(_))
    ));
}

#[test]
fn test_xz_of_garbage_tar_is_format_error() {
    let mut tar_bytes = PackageBuilder::new().add_file("md5sums", b"").build_tar();
    tar_bytes[148..156].copy_from_slice(b"zzzzzzzz");
    let fixture = Fixture::new(&xz_compress(&tar_bytes));

    assert!(matches!(
        fixture.extract(),
        Err(ExtractionError::ArchiveFormat(_))
    ));
}
