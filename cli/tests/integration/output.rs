//! JSON output integration tests for the cpr CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use serde_json::Value;

fn parse_stdout(stdout: &[u8]) -> Value {
    let text = String::from_utf8(stdout.to_vec()).expect("stdout is not UTF-8");
    serde_json::from_str(text.trim()).expect("stdout is not a JSON object")
}

#[test]
fn test_json_success_record() {
    let fx = TestFixture::new(b"0123456789");

    let mut cmd = cargo_bin_cmd!("cpr");
    let output = cmd
        .args(["-c", "--output", "json", "-s", "2", "-l", "4"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .output()
        .unwrap();

    assert!(output.status.success());
    let record = parse_stdout(&output.stdout);

    assert_eq!(record["schema_version"], "1.0");
    assert_eq!(record["mode"], "range");
    assert_eq!(record["source"], fx.src.display().to_string());
    assert_eq!(record["destination"], fx.dst.display().to_string());
    match record["outcome"].as_str() {
        Some("cloned") => assert!(record["bytes_copied"].is_null()),
        Some("copied") => assert_eq!(record["bytes_copied"], 4),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(record.get("error_code").is_none());
    assert_eq!(fx.dst_bytes(), b"2345");
}

#[test]
fn test_json_failure_record() {
    let fx = TestFixture::new(b"0123456789");

    let mut cmd = cargo_bin_cmd!("cpr");
    let output = cmd
        .args(["-c", "--output", "json", "-s", "8", "-l", "20"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let record = parse_stdout(&output.stdout);

    assert_eq!(record["mode"], "range");
    assert_eq!(record["outcome"], "failed");
    assert_eq!(record["error_code"], "source_exhausted");
    assert!(
        record["error_message"]
            .as_str()
            .unwrap()
            .contains("2 of 20")
    );
}

#[test]
fn test_json_whole_file_mode() {
    let fx = TestFixture::new(b"abc");

    let mut cmd = cargo_bin_cmd!("cpr");
    let output = cmd
        .args(["-c", "--output", "json"])
        .arg(&fx.src)
        .arg(&fx.dst)
        .output()
        .unwrap();

    assert!(output.status.success());
    let record = parse_stdout(&output.stdout);
    assert_eq!(record["mode"], "whole_file");
}
