use std::path::Path;

use assert_cmd::Command;
use dotscan::DotscanConfig;
use predicates::prelude::*;
use serde_json::Value;

fn dotscan() -> Command {
    Command::cargo_bin("dotscan").expect("dotscan binary")
}

fn write_squares_png(path: &Path) {
    let img = image::RgbaImage::from_fn(640, 480, |x, y| {
        if x % 32 >= 12 && x % 32 < 20 && y % 32 >= 12 && y % 32 < 20 {
            image::Rgba([220, 220, 220, 255])
        } else {
            image::Rgba([20, 20, 20, 255])
        }
    });
    img.save(path).expect("save png");
}

#[test]
fn projection_prints_row_major_matrix() {
    let out = dotscan()
        .args([
            "projection",
            "--sensor",
            "640x480",
            "--screen",
            "1080x1920",
            "--orientation",
            "portrait",
            "--near",
            "0.1",
            "--far",
            "100",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("json");

    let m = &json["projection"];
    assert_eq!(m[3][2].as_f64(), Some(-1.0));
    assert_eq!(m[0][1].as_f64(), Some(0.0));
    let m22 = m[2][2].as_f64().expect("m22");
    assert!((m22 - (-(100.1 / 99.9))).abs() < 1e-5);
    assert_eq!(json["alignment"]["rotation_deg"].as_f64(), Some(0.0));
    assert_eq!(json["device"], "android");
}

#[test]
fn desktop_projection_reports_landscape_left() {
    dotscan()
        .args([
            "projection",
            "--platform",
            "desktop",
            "--screen",
            "1920x1080",
            "--orientation",
            "portrait",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"orientation\": \"landscape_left\""))
        .stdout(predicate::str::contains("\"device\": \"desktop\""));
}

#[test]
fn rejects_unknown_orientation() {
    dotscan()
        .args(["projection", "--orientation", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown orientation"));
}

#[test]
fn log_level_accepts_known_names_only() {
    dotscan()
        .args(["--log-level", "debug", "projection"])
        .assert()
        .success();
    dotscan()
        .args(["projection", "--log-level", "off"])
        .assert()
        .success();
    dotscan()
        .args(["--log-level", "loud", "projection"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'loud'"));
}

#[test]
fn rejects_inverted_clip_planes() {
    dotscan()
        .args(["projection", "--near", "10", "--far", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid clip planes"));
}

#[test]
fn scan_writes_a_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("frame.png");
    let report = dir.path().join("report.json");
    write_squares_png(&img);

    dotscan()
        .arg("scan")
        .arg(&img)
        .args(["--ticks", "30", "--out"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("from 6 cycles"));

    let raw = std::fs::read_to_string(&report).expect("report");
    let json: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["cycles"].as_u64(), Some(6));
    let dots = json["dots"].as_array().expect("dots");
    assert!(!dots.is_empty());
    assert!(dots.len() <= 500);
    assert_eq!(json["sensor"]["width"].as_u64(), Some(640));
}

#[test]
fn scan_honours_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("frame.png");
    let cfg_path = dir.path().join("dotscan.json");
    write_squares_png(&img);

    let mut config = DotscanConfig::default();
    config.scan.frame_skip = 1;
    config.scan.max_points = 3;
    config.write_json(&cfg_path).expect("write config");

    let out = dotscan()
        .arg("scan")
        .arg(&img)
        .arg("--config")
        .arg(&cfg_path)
        .args(["--ticks", "10"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(json["cycles"].as_u64(), Some(10));
    assert!(json["dots"].as_array().expect("dots").len() <= 3);
}

#[test]
fn scan_reports_missing_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    dotscan()
        .arg("scan")
        .arg(dir.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load image"));
}

#[test]
fn init_config_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cfg.json");
    dotscan()
        .args(["init-config", "--out"])
        .arg(&path)
        .assert()
        .success();
    let loaded = DotscanConfig::load_json(&path).expect("load");
    assert_eq!(loaded, DotscanConfig::default());
}
