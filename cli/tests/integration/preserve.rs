//! Attribute preservation integration tests for the cpr CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use std::fs;
use std::time::{Duration, SystemTime};

fn set_old_mtime(path: &std::path::Path) -> SystemTime {
    let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(old).unwrap();
    old
}

#[test]
fn test_preserve_timestamps() {
    let fx = TestFixture::new(b"content");
    let old = set_old_mtime(&fx.src);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-t"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    let mtime = fs::metadata(&fx.dst).unwrap().modified().unwrap();
    assert_eq!(mtime, old);
}

#[test]
fn test_timestamps_not_preserved_by_default() {
    let fx = TestFixture::new(b"content");
    let old = set_old_mtime(&fx.src);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.arg("-c").arg(&fx.src).arg(&fx.dst).assert().success();

    let mtime = fs::metadata(&fx.dst).unwrap().modified().unwrap();
    assert_ne!(mtime, old);
}

#[cfg(unix)]
#[test]
fn test_preserve_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new(b"#!/bin/sh\n");
    fs::set_permissions(&fx.src, fs::Permissions::from_mode(0o750)).unwrap();

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-p"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    let mode = fs::metadata(&fx.dst).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o750);
}

#[cfg(unix)]
#[test]
fn test_archive_preserves_everything_on_range() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new(b"0123456789").with_dst(b"..........");
    let old = set_old_mtime(&fx.src);
    fs::set_permissions(&fx.src, fs::Permissions::from_mode(0o604)).unwrap();

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-a", "-c", "-s", "0", "-d", "5", "-l", "5"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    let meta = fs::metadata(&fx.dst).unwrap();
    assert_eq!(meta.modified().unwrap(), old);
    assert_eq!(meta.permissions().mode() & 0o777, 0o604);
    assert_eq!(fx.dst_bytes(), b".....01234");
}
