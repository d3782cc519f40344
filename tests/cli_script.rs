use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn script(home: &TempDir, input: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.env("POCKET_LEDGER_HOME", home.path())
        .env("POCKET_LEDGER_CLI_SCRIPT", "1")
        .env_remove("RUST_LOG")
        .write_stdin(input.to_string())
        .assert()
        .success()
}

#[test]
fn records_and_summarises_expenses() {
    let home = TempDir::new().unwrap();
    script(&home, "500 обед\n1200 такси\n/stats all\nexit\n")
        .stdout(contains("Recorded #1: 500.00 ₽ · обед (Еда)"))
        .stdout(contains("Total (all time): 1700.00 ₽"))
        .stdout(contains("Транспорт: 1200.00 ₽ (70.6%)"))
        .stdout(contains("Еда: 500.00 ₽ (29.4%)"));
    assert!(home.path().join("expenses.db").exists());
}

#[test]
fn entries_persist_between_runs() {
    let home = TempDir::new().unwrap();
    script(&home, "90 метро\n");
    script(&home, "stats_all\n").stdout(contains("Total (all time): 90.00 ₽"));
}

#[test]
fn unreadable_amount_is_reported() {
    let home = TempDir::new().unwrap();
    script(&home, "обед пятьсот\nstats_all\n")
        .stdout(contains("Could not read that"))
        .stdout(contains("No records for all time."));
}

#[test]
fn clear_requires_confirmation() {
    let home = TempDir::new().unwrap();
    script(&home, "100 кофе\n/clear\nconfirm_clear\nconfirm_clear\n")
        .stdout(contains("This removes all 1 entries"))
        .stdout(contains("All data cleared (1 entries removed)."))
        .stdout(contains("There is no clear request to confirm."));
}

#[test]
fn version_reports_package() {
    let home = TempDir::new().unwrap();
    script(&home, "/version\n").stdout(contains("pocket_ledger 0.1.0"));
}

#[test]
fn export_writes_into_reports_dir() {
    let home = TempDir::new().unwrap();
    script(&home, "500 обед\n/pdf all\n").stdout(contains("Saved to"));

    let written: Vec<_> = std::fs::read_dir(home.path().join("reports"))
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(written.len(), 1);
    let json = std::fs::read_to_string(written[0].path()).unwrap();
    assert!(json.contains("\"Еда\""));
}
