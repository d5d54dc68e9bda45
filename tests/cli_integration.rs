//! End-to-end tests of the text report front end.

mod common;

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridwatch"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("gridwatch process should run")
}

#[test]
fn prints_every_page_for_sample_data() {
    let data = common::sample_path();
    let out = run(&["--data", data.to_str().expect("utf-8 path")]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    for heading in [
        "Grid Overview",
        "Devices Status",
        "Predictive Analytics",
        "System Alerts",
        "Grid Stability Data Upload",
    ] {
        assert!(stdout.contains(heading), "missing {heading}:\n{stdout}");
    }
    assert!(stdout.contains("Readings loaded: 6"));
}

#[test]
fn single_page_without_data_shows_upload_prompt() {
    let out = run(&["--page", "/alerts"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout.trim(),
        "Upload data in \"Data Analysis\" section to see alerts."
    );
}

#[test]
fn alerts_page_lists_unstable_readings() {
    let data = common::sample_path();
    let out = run(&["--data", data.to_str().expect("utf-8 path"), "--page", "alerts"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout.matches("Unstable condition detected").count(),
        common::SAMPLE_UNSTABLE
    );
    assert!(stdout.contains("Stab=0.0553 at τ1=2.96, τ2=3.08"));
}

#[test]
fn rejected_csv_prints_message_and_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("partial.csv");
    std::fs::write(&path, "tau1,tau2,stabf\n1,2,stable\n").expect("write csv");

    let out = run(&["--data", path.to_str().expect("utf-8 path")]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("CSV missing required columns: tau3, tau4, p1"));
}

#[test]
fn export_writes_canonical_csv() {
    let dir = tempfile::tempdir().expect("temp dir");
    let export = dir.path().join("clean.csv");
    let data = common::sample_path();
    let out = run(&[
        "--data",
        data.to_str().expect("utf-8 path"),
        "--export",
        export.to_str().expect("utf-8 path"),
        "--page",
        "/data",
    ]);
    assert!(out.status.success());

    let written = std::fs::read_to_string(&export).expect("export exists");
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some(common::header().as_str()));
    assert_eq!(lines.count(), common::SAMPLE_ROWS);
}

#[test]
fn unknown_argument_is_rejected() {
    let out = run(&["--bogus"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown argument: --bogus"));
}
