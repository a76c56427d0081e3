//! CLI command integration tests.
//! Each test points HOME at a temp directory so no user config leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pillars_cmd(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pillars").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("PILLARS_CONFIG")
        .env_remove("PILLARS_HTTP_BIND")
        .env_remove("RUST_LOG");
    cmd
}

const CHART: [&str; 4] = ["甲寅", "丙午", "戊戌", "庚申"];

#[test]
fn chart_text_report() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .arg("chart")
        .args(CHART)
        .assert()
        .success()
        .stdout(predicate::str::contains("chart:      甲寅 丙午 戊戌 庚申"))
        .stdout(predicate::str::contains("day master: 戊 (earth)"))
        .stdout(predicate::str::contains("triple harmony: 寅午戌 fire frame -> fire"))
        .stdout(predicate::str::contains("diagnosis:"));
}

#[test]
fn chart_accepts_pinyin() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["chart", "jia-yin", "bing-wu", "wu-xu", "geng-shen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chart:      甲寅 丙午 戊戌 庚申"));
}

#[test]
fn chart_json_output() {
    let home = TempDir::new().unwrap();
    let output = pillars_cmd(&home)
        .arg("chart")
        .args(CHART)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["dayMaster"]["stem"], "戊");
    assert!(v["totalScore"].as_f64().unwrap() > 0.0);
    assert_eq!(v["pillars"].as_array().unwrap().len(), 4);
}

#[test]
fn chart_rejects_unknown_symbol() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["chart", "甲寅", "丙午", "戊戌", "XX"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse chart"));
}

#[test]
fn chart_requires_four_pillars() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["chart", "甲寅", "丙午"])
        .assert()
        .failure();
}

#[test]
fn relations_lists_both_domains() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["relations", "甲子", "庚午", "甲子", "己巳"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stem relations:"))
        .stdout(predicate::str::contains("甲己 combine into earth"))
        .stdout(predicate::str::contains("branch relations:"))
        .stdout(predicate::str::contains("子午 clash"));
}

#[test]
fn file_reads_wire_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("chart.json");
    std::fs::write(
        &input,
        r#"{"pillars": [
            {"stem": "甲", "branch": "子", "hideHeavenStems": [{"name": "癸", "level": "main", "tenStar": "正财"}]},
            {"stem": "丙", "branch": "寅"},
            {"stem": "戊", "branch": "辰"},
            {"stem": "庚", "branch": "午"}
        ]}"#,
    )
    .unwrap();

    pillars_cmd(&home)
        .arg("file")
        .arg(&input)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"balanceIndex\""));
}

#[test]
fn file_from_stdin() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["file", "-"])
        .write_stdin(r#"[{"stem":"甲","branch":"子"},{"stem":"丙","branch":"寅"},{"stem":"戊","branch":"辰"},{"stem":"庚","branch":"午"}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("chart:      甲子 丙寅 戊辰 庚午"));
}

#[test]
fn file_missing_reports_path() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .args(["file", "/nonexistent/chart.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read /nonexistent/chart.json"));
}

#[test]
fn config_selects_json_output() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("pillars.toml");
    std::fs::write(&config, "[output]\nformat = \"json\"\n").unwrap();

    pillars_cmd(&home)
        .arg("--config")
        .arg(&config)
        .arg("chart")
        .args(CHART)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn config_from_home_directory() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".pillars");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[output]\nformat = \"json\"\n").unwrap();

    pillars_cmd(&home)
        .arg("chart")
        .args(CHART)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalScore\""));
}

#[test]
fn invalid_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "[output]\nformat = \"xml\"\n").unwrap();

    pillars_cmd(&home)
        .env("PILLARS_CONFIG", &config)
        .arg("chart")
        .args(CHART)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn verbose_prints_derivation_log() {
    let home = TempDir::new().unwrap();
    pillars_cmd(&home)
        .arg("--verbose")
        .arg("chart")
        .args(CHART)
        .assert()
        .success()
        .stdout(predicate::str::contains("year stem 甲"))
        .stderr(predicate::str::contains("stage complete"));
}
