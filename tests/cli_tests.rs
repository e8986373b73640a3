//! Integration tests for the gpx-densify binary
//!
//! Runs the built binary against scratch files and checks exit codes,
//! stdout/stderr messages and the written output.

#![cfg(feature = "cli")]

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const GAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"><ele>100.00</ele><time>2024-01-01T00:00:00Z</time></trkpt>
      <trkpt lat="4.0" lon="8.0"><ele>110.00</ele><time>2024-01-01T00:00:04Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>
"#;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gpx-densify"))
}

#[test]
fn test_cli_writes_densified_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.gpx");
    let output = temp_dir.path().join("out.gpx");
    fs::write(&input, GAP).unwrap();

    let result = bin()
        .args([&input, &output])
        .output()
        .expect("Failed to run gpx-densify");

    assert!(
        result.status.success(),
        "gpx-densify failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Interpolated GPX saved to:"));
    assert!(stdout.contains("out.gpx"));

    let written = fs::read_to_string(&output).expect("Output file should exist");
    for (lat, lon, ele, sec) in [
        ("1.0000000", "2.0000000", "102.50", 1),
        ("2.0000000", "4.0000000", "105.00", 2),
        ("3.0000000", "6.0000000", "107.50", 3),
    ] {
        let expected = format!(
            r#"<trkpt lat="{lat}" lon="{lon}"><ele>{ele}</ele><time>2024-01-01T00:00:0{sec}Z</time></trkpt>"#
        );
        assert!(written.contains(&expected), "missing {expected}");
    }
}

#[test]
fn test_cli_no_elevation_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.gpx");
    let output = temp_dir.path().join("out.gpx");
    fs::write(&input, GAP).unwrap();

    let result = bin()
        .arg(&input)
        .arg(&output)
        .arg("--no-elevation")
        .output()
        .expect("Failed to run gpx-densify");
    assert!(result.status.success());

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written.matches("<ele>").count(), 2, "only originals keep elevation");
}

#[test]
fn test_cli_wrong_argument_count() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let only_input = temp_dir.path().join("in.gpx");
    fs::write(&only_input, GAP).unwrap();

    for args in [vec![], vec![only_input.clone()], vec![only_input.clone(), "a".into(), "b".into()]] {
        let result = bin().args(&args).output().expect("Failed to run gpx-densify");
        assert!(!result.status.success(), "{} args should fail", args.len());
        let stderr = String::from_utf8_lossy(&result.stderr);
        assert!(stderr.contains("Usage"), "usage expected on stderr: {stderr}");
    }
    assert!(!temp_dir.path().join("a").exists());
}

#[test]
fn test_cli_warns_when_nothing_changes() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.gpx");
    let output = temp_dir.path().join("out.gpx");
    fs::write(&input, r#"<gpx version="1.1"><metadata/></gpx>"#).unwrap();

    let result = bin().args([&input, &output]).output().unwrap();
    assert!(result.status.success(), "no segments is not fatal");
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("No <trkseg> found or no changes made."));
    assert!(output.exists(), "output is still written");
}

#[test]
fn test_cli_broken_input_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("in.gpx");
    let output = temp_dir.path().join("out.gpx");
    fs::write(&input, "<gpx><trk>").unwrap();

    let result = bin().args([&input, &output]).output().unwrap();
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Failed to densify"), "stderr: {stderr}");
    assert!(!output.exists());
}
