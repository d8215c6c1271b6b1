//! Range-mode integration tests for the cpr CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, noise};
use rstest::rstest;

#[test]
fn test_range_into_middle_of_destination() {
    let data = noise(500);
    let fx = TestFixture::new(&data).with_dst(&[0xAA; 1000]);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", "0", "-d", "200", "-l", "100"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    let out = fx.dst_bytes();
    assert_eq!(out.len(), 1000);
    assert!(out[..200].iter().all(|&b| b == 0xAA));
    assert_eq!(&out[200..300], &data[..100]);
    assert!(out[300..].iter().all(|&b| b == 0xAA));
}

#[test]
fn test_range_never_truncates_destination() {
    let fx = TestFixture::new(b"XY").with_dst(b"0123456789");

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-d", "4", "-l", "2"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    assert_eq!(fx.dst_bytes(), b"0123XY6789");
}

#[test]
fn test_range_to_end_of_source() {
    let data = noise(4096);
    let fx = TestFixture::new(&data);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", "1000", "-l", "0"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    assert_eq!(fx.dst_bytes(), &data[1000..]);
}

#[test]
fn test_range_creates_missing_destination() {
    let fx = TestFixture::new(b"abcdef");

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", "2"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    assert_eq!(fx.dst_bytes(), b"cdef");
}

#[test]
fn test_range_past_source_end_fails() {
    let data = noise(100);
    let fx = TestFixture::new(&data);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", "90", "-l", "50"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .failure()
        .code(1);

    // The ten available bytes were written before the source ran out.
    assert_eq!(fx.dst_bytes(), &data[90..]);
}

#[test]
fn test_small_block_size() {
    let data = noise(3000);
    let fx = TestFixture::new(&data);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-b", "7", "-s", "0"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    assert_eq!(fx.dst_bytes(), data);
}

#[rstest]
#[case("16")]
#[case("0x10")]
#[case("0X10")]
#[case("020")]
fn test_numeric_argument_forms(#[case] offset: &str) {
    let data: Vec<u8> = (0..64).collect();
    let fx = TestFixture::new(&data);

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", offset, "-l", "8"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .assert()
        .success();

    assert_eq!(fx.dst_bytes(), &data[16..24]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_zero_length_from_sizeless_source_matches_whole_file() {
    // procfs reports a size of zero for files that do have content.
    let fx = TestFixture::new(b"");
    let whole = fx.dir.path().join("whole.txt");
    let expected = std::fs::read("/proc/version").unwrap();

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "/proc/version"])
        .arg(&whole)
        .assert()
        .success();

    let mut cmd = cargo_bin_cmd!("cpr");
    cmd.args(["-c", "-s", "0", "-d", "0", "-l", "0", "/proc/version"])
        .arg(&fx.dst)
        .assert()
        .success();

    assert!(!expected.is_empty());
    assert_eq!(std::fs::read(&whole).unwrap(), expected);
    assert_eq!(fx.dst_bytes(), expected);
}
