//! Integration tests for apgcheck-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use apgcheck_core::test_utils::PackageBuilder;
use apgcheck_core::test_utils::metadata_v1;
use apgcheck_core::test_utils::metadata_v2;
use apgcheck_core::test_utils::write_package;
use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

const SUCCESS: &str = "The file specified is the correct apg";

/// A package on disk plus a private parent for the quarantine directory.
struct Workspace {
    temp: TempDir,
    package: PathBuf,
    scratch: PathBuf,
}

impl Workspace {
    fn new(apg: &[u8]) -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let package = write_package(temp.path(), "hello.apg", apg);
        let scratch = temp.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        Self {
            temp,
            package,
            scratch,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = apgcheck_cmd();
        cmd.arg("--apgfile")
            .arg(&self.package)
            .arg("--tmpdir")
            .arg(&self.scratch)
            .env_remove("APGCHECK_LOG");
        cmd
    }

    fn assert_scratch_empty(&self) {
        let leftovers: Vec<_> = fs::read_dir(&self.scratch).unwrap().collect();
        assert!(leftovers.is_empty(), "quarantine left behind: {leftovers:?}");
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }
}

fn apgcheck_cmd() -> Command {
    cargo_bin_cmd!("apgcheck")
}

fn valid_v1() -> Vec<u8> {
    PackageBuilder::valid(&metadata_v1())
        .add_directory("data/usr/bin/")
        .add_file("data/usr/bin/hello", b"#!/bin/sh\necho hello\n")
        .build()
}

#[test]
fn test_version_flag() {
    apgcheck_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apgcheck"));
}

#[test]
fn test_help_flag() {
    apgcheck_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--apgfile"))
        .stdout(predicate::str::contains("--format-version"));
}

#[test]
fn test_missing_apgfile_is_usage_error() {
    apgcheck_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--apgfile"));
}

#[test]
fn test_unknown_format_version_is_usage_error() {
    apgcheck_cmd()
        .args(["-a", "hello.apg", "-f", "3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported format version"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    apgcheck_cmd()
        .args(["-a", "hello.apg", "-v", "-q"])
        .assert()
        .code(2);
}

#[test]
fn test_valid_package_passes() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains(SUCCESS));

    ws.assert_scratch_empty();
}

#[test]
fn test_valid_v2_package_passes() {
    let ws = Workspace::new(&PackageBuilder::valid(&metadata_v2()).build());

    ws.cmd()
        .args(["-f", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(SUCCESS));
}

#[test]
fn test_v1_package_fails_v2_schema() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .args(["--format-version", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("schema error"))
        .stdout(predicate::str::contains(
            "missing or empty fields in metadata: type, tags, conf",
        ))
        .stdout(predicate::str::contains(SUCCESS).not());

    ws.assert_scratch_empty();
}

#[test]
fn test_missing_md5sums_fails() {
    let apg = PackageBuilder::new()
        .add_directory("data/")
        .add_metadata(&metadata_v1())
        .build();
    let ws = Workspace::new(&apg);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "a required file or folder is missing: md5sums",
        ));

    ws.assert_scratch_empty();
}

#[test]
fn test_empty_required_field_fails() {
    let mut metadata = metadata_v1();
    metadata["version"] = Value::from("");
    let ws = Workspace::new(&PackageBuilder::valid(&metadata).build());

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("fields in metadata: version"));
}

#[test]
fn test_invalid_json_fails() {
    let apg = PackageBuilder::new()
        .add_directory("data/")
        .add_file("md5sums", b"")
        .add_file("metadata.json", b"{\"name\": ")
        .build();
    let ws = Workspace::new(&apg);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("metadata is not valid JSON"));
}

#[test]
fn test_traversal_package_rejected_without_escape() {
    let apg = PackageBuilder::valid(&metadata_v1())
        .add_raw_file(b"../../escaped", b"owned")
        .build();
    let ws = Workspace::new(&apg);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("path security violation"))
        .stdout(predicate::str::contains("HINT"));

    assert!(!ws.root().join("escaped").exists());
    assert!(!ws.scratch.join("escaped").exists());
    ws.assert_scratch_empty();
}

#[test]
fn test_symlink_package_rejected() {
    let apg = PackageBuilder::valid(&metadata_v1())
        .add_symlink("data/passwd", "/etc/passwd")
        .build();
    let ws = Workspace::new(&apg);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("symbolic link entries are not allowed"));

    ws.assert_scratch_empty();
}

#[test]
fn test_not_xz_rejected() {
    let tar_only = PackageBuilder::valid(&metadata_v1()).build_tar();
    let ws = Workspace::new(&tar_only);

    ws.cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("archive format error"));

    ws.assert_scratch_empty();
}

#[test]
fn test_nonexistent_package() {
    let temp = TempDir::new().expect("failed to create temp dir");

    apgcheck_cmd()
        .arg("-a")
        .arg(temp.path().join("missing.apg"))
        .arg("--tmpdir")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("I/O error"));

    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_max_total_size_flag() {
    let apg = PackageBuilder::valid(&metadata_v1())
        .add_file("data/blob", &[0x55; 4096])
        .build();
    let ws = Workspace::new(&apg);

    ws.cmd().assert().success();

    ws.cmd()
        .args(["--max-total-size", "1K"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("size limit exceeded"))
        .stdout(predicate::str::contains("--max-total-size"));

    ws.assert_scratch_empty();
}

#[test]
fn test_skipped_entry_is_a_warning() {
    let apg = PackageBuilder::valid(&metadata_v1())
        .add_fifo("data/pipe")
        .build();
    let ws = Workspace::new(&apg);

    let output = ws.cmd().output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(
        stdout
            .matches("WARNING: skipped fifo entry 'data/pipe'")
            .count(),
        1
    );
    assert!(stdout.contains(SUCCESS));
    // Reported once by the formatter, not again by the default log filter
    assert!(!stderr.contains("data/pipe"), "{stderr}");
}

#[test]
fn test_quiet_mode() {
    let ws = Workspace::new(&valid_v1());
    ws.cmd().arg("--quiet").assert().success().stdout("");

    // Failures are still reported
    ws.cmd()
        .args(["--quiet", "-f", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("schema error"));
}

#[test]
fn test_verbose_mode_prints_summary() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted: 3"))
        .stdout(predicate::str::contains("Format version: 1"));
}

#[test]
fn test_no_color_output_is_plain() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains(SUCCESS))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_json_output_success() {
    let ws = Workspace::new(&valid_v1());

    let output = ws.cmd().arg("--json").output().unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["operation"], "check");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["verdict"], "good");
    assert_eq!(json["data"]["files_extracted"], 3);
    assert_eq!(json["data"]["name"], "hello");
}

#[test]
fn test_json_output_schema_failure() {
    let ws = Workspace::new(&valid_v1());

    let output = ws.cmd().args(["--json", "-f", "2"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["data"]["verdict"], "bad");
    assert_eq!(
        json["data"]["missing_fields"],
        serde_json::json!(["type", "tags", "conf"])
    );
}

#[test]
fn test_json_output_extraction_failure() {
    let apg = PackageBuilder::valid(&metadata_v1())
        .add_raw_file(b"/etc/cron.d/evil", b"* * * * * root sh")
        .build();
    let ws = Workspace::new(&apg);

    let output = ws.cmd().arg("--json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "check");
    assert_eq!(json["status"], "error");
    assert!(json.get("data").is_none());
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("path security violation")
    );
    ws.assert_scratch_empty();
}

#[test]
fn test_log_filter_from_environment() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .env("APGCHECK_LOG", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("checking package"));
}

#[test]
fn test_logs_stay_off_stdout() {
    let ws = Workspace::new(&valid_v1());

    ws.cmd()
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("checking package").not());
}

#[cfg(unix)]
#[test]
fn test_interrupt_removes_quarantine() {
    use std::process::Stdio;
    use std::thread;
    use std::time::Duration;
    use std::time::Instant;

    let payload = vec![0u8; 8 * 1024 * 1024];
    let mut builder = PackageBuilder::valid(&metadata_v1());
    for i in 0..40 {
        builder = builder.add_file(&format!("data/blob{i:02}"), &payload);
    }
    let ws = Workspace::new(&builder.build());

    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_apgcheck"))
        .arg("--apgfile")
        .arg(&ws.package)
        .arg("--tmpdir")
        .arg(&ws.scratch)
        .arg("--quiet")
        .env_remove("APGCHECK_LOG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait until extraction has started writing into the quarantine.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let started = fs::read_dir(&ws.scratch)
            .unwrap()
            .filter_map(Result::ok)
            .any(|q| q.path().join("data").exists());
        if started || Instant::now() > deadline {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    let killed = std::process::Command::new("kill")
        .arg("-INT")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(killed.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(130));
    ws.assert_scratch_empty();
}
