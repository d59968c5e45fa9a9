//! Integration tests for the arcscrub binary.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use arcscrub_core::test_utils::RawZipBuilder;
use arcscrub_core::test_utils::TarTestBuilder;
use arcscrub_core::test_utils::gzip;
use arcscrub_core::test_utils::owned_by;
use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

fn arcscrub_cmd() -> Command {
    cargo_bin_cmd!("arcscrub")
}

fn write(temp: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, bytes).expect("failed to write fixture");
    path
}

fn dirty_tar(temp: &TempDir, name: &str) -> PathBuf {
    let owner = owned_by(1_234_567, 1000, "alice");
    let bytes = TarTestBuilder::new()
        .add_file_owned("notes.txt", b"hello", &owner)
        .build();
    write(temp, name, &bytes)
}

fn clean_tar(temp: &TempDir, name: &str) -> PathBuf {
    let bytes = TarTestBuilder::new().add_file("notes.txt", b"hello").build();
    write(temp, name, &bytes)
}

#[test]
fn test_version_flag() {
    arcscrub_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("arcscrub"));
}

#[test]
fn test_help_lists_subcommands() {
    arcscrub_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_missing_files_is_usage_error() {
    arcscrub_cmd().arg("clean").assert().failure().code(2);
}

#[test]
fn test_check_clean_file_succeeds() {
    let temp = TempDir::new().unwrap();
    let path = clean_tar(&temp, "clean.tar");

    arcscrub_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_check_dirty_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    arcscrub_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("dirty"))
        .stderr(predicate::str::contains("carry metadata"));
}

#[test]
fn test_check_verbose_shows_format() {
    let temp = TempDir::new().unwrap();
    let bytes = TarTestBuilder::new().add_file("a.txt", b"a").build();
    let path = write(&temp, "plain.tar.gz", &gzip(&bytes));

    arcscrub_cmd()
        .args(["check", "-v"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(tar.gz)"));
}

#[test]
fn test_show_lists_tar_bookkeeping() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    arcscrub_cmd()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt"))
        .stdout(predicate::str::contains("uname=alice"))
        .stdout(predicate::str::contains("uid=1000"));
}

#[test]
fn test_show_clean_file() {
    let temp = TempDir::new().unwrap();
    let path = clean_tar(&temp, "clean.tar");

    arcscrub_cmd()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No metadata found"));
}

#[test]
fn test_show_zip_comment() {
    let temp = TempDir::new().unwrap();
    let bytes = RawZipBuilder::new()
        .add_entry("readme.txt", b"hi", "secret")
        .build();
    let path = write(&temp, "bundle.zip", &bytes);

    arcscrub_cmd()
        .arg("show")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("readme.txt"))
        .stdout(predicate::str::contains("secret"));
}

#[test]
fn test_show_json() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    let output = arcscrub_cmd()
        .args(["show", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "show");
    assert_eq!(json["status"], "success");
    let record = &json["data"][0]["metadata"]["notes.txt"];
    assert_eq!(record["kind"], "tar");
    assert_eq!(record["uid"], 1000);
    assert_eq!(record["uname"], "alice");
}

#[test]
fn test_clean_replaces_original() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    arcscrub_cmd()
        .arg("clean")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleaned"));

    assert!(!temp.path().join("dirty.tar.cleaned").exists());
    arcscrub_cmd().arg("check").arg(&path).assert().success();
}

#[test]
fn test_clean_backup_keeps_original() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");
    let before = fs::read(&path).unwrap();

    arcscrub_cmd()
        .args(["clean", "--backup"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("dirty.tar.cleaned"));

    assert_eq!(fs::read(&path).unwrap(), before);
    let cleaned = temp.path().join("dirty.tar.cleaned");
    arcscrub_cmd().arg("check").arg(&cleaned).assert().success();
}

#[test]
fn test_clean_backup_warns_before_overwriting() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");
    write(&temp, "dirty.tar.cleaned", b"stale");

    arcscrub_cmd()
        .args(["clean", "-b"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("WARNING"));
}

#[test]
fn test_clean_multiple_files_json() {
    let temp = TempDir::new().unwrap();
    let first = dirty_tar(&temp, "one.tar");
    let second = dirty_tar(&temp, "two.tar");

    let output = arcscrub_cmd()
        .args(["clean", "--json"])
        .arg(&first)
        .arg(&second)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "clean");
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"][1]["backup"], false);
}

#[test]
fn test_clean_quiet_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    arcscrub_cmd()
        .args(["clean", "-q"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_clean_zip_is_unsupported() {
    let temp = TempDir::new().unwrap();
    let bytes = RawZipBuilder::new().add_entry("a.txt", b"a", "").build();
    let path = write(&temp, "a.zip", &bytes);

    arcscrub_cmd()
        .arg("clean")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only be inspected"))
        .stderr(predicate::str::contains("HINT"));

    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_unsupported_file_shows_hint() {
    let temp = TempDir::new().unwrap();
    let path = write(&temp, "photo.png", PNG_MAGIC);

    arcscrub_cmd()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("image/png"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_unsupported_member_needs_pass_through() {
    let temp = TempDir::new().unwrap();
    let bytes = TarTestBuilder::new()
        .add_file_owned("photo.png", PNG_MAGIC, &owned_by(99, 7, "bob"))
        .build();
    let path = write(&temp, "photos.tar", &bytes);

    arcscrub_cmd()
        .arg("clean")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pass-through"));
    assert_eq!(fs::read(&path).unwrap(), bytes);

    arcscrub_cmd()
        .args(["clean", "--pass-through"])
        .arg(&path)
        .assert()
        .success();
    arcscrub_cmd()
        .args(["check", "--pass-through"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_max_depth_limits_nesting() {
    let temp = TempDir::new().unwrap();
    let inner = TarTestBuilder::new().add_file("f.txt", b"x").build();
    let outer = TarTestBuilder::new().add_file("inner.tar", &inner).build();
    let path = write(&temp, "outer.tar", &outer);

    arcscrub_cmd()
        .args(["clean", "--max-depth", "1"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-depth"));

    arcscrub_cmd()
        .args(["clean", "--max-depth", "2"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_scratch_dir_is_left_empty() {
    let temp = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let path = dirty_tar(&temp, "dirty.tar");

    arcscrub_cmd()
        .arg("clean")
        .arg("--scratch-dir")
        .arg(scratch.path())
        .arg(&path)
        .assert()
        .success();

    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn test_formats_lists_tar_and_zip() {
    arcscrub_cmd()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("application/x-tar"))
        .stdout(predicate::str::contains("application/zip"))
        .stdout(predicate::str::contains("text/plain"));
}

#[test]
fn test_formats_json() {
    let output = arcscrub_cmd().args(["formats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "formats");
    assert!(
        json["data"]["supported"]
            .as_array()
            .unwrap()
            .iter()
            .any(|m| m == "application/gzip")
    );
}

#[test]
fn test_completion_bash() {
    arcscrub_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("arcscrub"));
}

#[test]
fn test_missing_file_reports_io_error() {
    let temp = TempDir::new().unwrap();

    arcscrub_cmd()
        .arg("show")
        .arg(temp.path().join("absent.tar"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.tar"));
}
