use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg("tests/fixtures/coupons.csv")
        .arg("--as-of")
        .arg("2025-07-01");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "coupon_id,user_id,original_amount,remaining_amount,expiry_date,status",
        ))
        // past their expiry date: swept, balances forfeited
        .stdout(predicate::str::contains(
            "CPN1,user-1,20000.00,0.00,2025-06-30,expired",
        ))
        .stdout(predicate::str::contains(
            "CPN4,user-1,3000.00,0.00,2025-06-01,expired",
        ))
        // still valid or already settled: untouched
        .stdout(predicate::str::contains(
            "CPN2,user-2,5000.00,5000.00,2025-09-30,active",
        ))
        .stdout(predicate::str::contains(
            "CPN3,user-3,8000.00,0.00,2025-08-15,used",
        ));

    Ok(())
}

#[test]
fn test_run_summary_goes_to_stderr() {
    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg("tests/fixtures/coupons.csv")
        .arg("--as-of")
        .arg("2025-07-01");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("processed 2 coupons"))
        .stderr(predicate::str::contains("2 expired"));
}

#[test]
fn test_malformed_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("coupons.csv");
    common::write_coupon_csv(
        &input,
        &[
            "CPN1,user-1,1000.00,500.00,2025-09-30,active",
            "CPN2,user-2,not-a-number,0,2025-09-30,active",
            "CPN3,user-3,1000.00,5000.00,2025-09-30,active",
            "CPN4,user-4,1000.00,1000.00,2025-09-30,frozen",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg(&input).arg("--as-of").arg("2025-07-01");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("skipping invalid coupon row"))
        .stdout(predicate::str::contains(
            "CPN1,user-1,1000.00,500.00,2025-09-30,active",
        ))
        .stdout(predicate::str::contains("CPN2").not())
        .stdout(predicate::str::contains("CPN3").not())
        .stdout(predicate::str::contains("CPN4").not());
}

#[test]
fn test_empty_ledger_runs_clean() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    common::write_coupon_csv(&input, &[]).unwrap();

    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg(&input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(common::CSV_HEADER))
        .stderr(predicate::str::contains("no expired coupons to process"));
}

#[test]
fn test_missing_input_file_fails() {
    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg("does-not-exist.csv");

    cmd.assert().failure();
}

#[test]
fn test_bulk_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bulk.csv");
    common::generate_coupon_csv(&input, 250, "2025-06-30").unwrap();

    let mut cmd = Command::new(cargo_bin!("coupon-engine"));
    cmd.arg(&input).arg("--as-of").arg("2025-07-01");

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    // header plus every coupon, all retired
    assert_eq!(stdout.lines().count(), 251);
    assert_eq!(
        stdout
            .lines()
            .skip(1)
            .filter(|line| line.ends_with(",expired"))
            .count(),
        250
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("processed 250 coupons"));
}
