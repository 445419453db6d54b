use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TIKTOK: &str = "COST TT ADS,,,\n\
MONTH,A1,L10,รวม\n\
JAN,\"1,000\",\"2,000\",\"3,000\"\n\
วันที่,A1,L10,รวม\n\
2026-01-01,\"100\",\"1,200\",\"1,300\"\n\
2026-01-02,\"300\",\"400\",\"700\"\n";

const BUDGET: &str = "Category,ABX,ACE,Sale,Review,Brand\n\
A1,\"10,000\",\"2,000\",60%,40%,0\n\
L10,\"20,000\",0,0.5,0.5,0\n\
SUM,\"30,000\",\"2,000\",,,\n";

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tiktok.csv"), TIKTOK).unwrap();
    fs::write(dir.path().join("budget_tt_jan.csv"), BUDGET).unwrap();
    let config = format!(
        r#"{{ "data_dir": {:?}, "budget_sheets": {{ "tiktok": {{ "JAN": "budget_tt_jan.csv" }} }} }}"#,
        dir.path().display().to_string()
    );
    fs::write(dir.path().join("config.json"), config).unwrap();
    dir
}

fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ads-cost").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.join("config.json"));
    cmd
}

#[test]
fn summary_reports_totals_and_ranking() {
    let dir = workspace();
    cmd(dir.path())
        .args(["--platform", "tiktok", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total cost: ฿2,000"))
        .stdout(predicate::str::contains("Days: 2"))
        .stdout(predicate::str::contains("L10"));
}

#[test]
fn date_filter_narrows_the_table() {
    let dir = workspace();
    cmd(dir.path())
        .args(["--start", "2026-01-02", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("02/01"))
        .stdout(predicate::str::contains("01/01").not());
}

#[test]
fn malformed_date_fails() {
    let dir = workspace();
    cmd(dir.path())
        .args(["--start", "02/01/2026", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date '02/01/2026'"));
}

#[test]
fn table_search_limits_columns() {
    let dir = workspace();
    cmd(dir.path())
        .args(["table", "--search", "l1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("L10"))
        .stdout(predicate::str::contains("A1").not());
}

#[test]
fn pacing_reads_configured_budget_sheet() {
    let dir = workspace();
    cmd(dir.path())
        .args(["pacing", "--month", "JAN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget: ฿32,000"))
        .stdout(predicate::str::contains("Spent: ฿2,000"));
}

#[test]
fn unknown_month_fails() {
    let dir = workspace();
    cmd(dir.path())
        .args(["pacing", "--month", "XYZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown month"));
}

#[test]
fn unknown_platform_is_rejected() {
    let dir = workspace();
    cmd(dir.path())
        .args(["--platform", "instagram", "summary"])
        .assert()
        .failure();
}

#[test]
fn export_writes_files() {
    let dir = workspace();
    let out = dir.path().join("out");
    cmd(dir.path())
        .args(["export", "--out-dir"])
        .arg(&out)
        .assert()
        .success();
    let csv = fs::read_to_string(out.join("tiktok_table.csv")).unwrap();
    assert!(csv.starts_with("วันที่,A1,L10,รวม"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("tiktok_summary.json")).unwrap())
            .unwrap();
    assert_eq!(json["platform"], "tiktok");
    assert_eq!(json["cards"]["total_cost"], 2000.0);
}

#[test]
fn missing_sheets_fall_back_to_samples() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("ads-cost").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .args(["--platform", "facebook", "summary"])
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Days: 5"));
}
