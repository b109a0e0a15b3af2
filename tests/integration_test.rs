use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::process;

const EXPECTED_CSV: &str = r#"Test Class,Test Method,Result,Failure Reason
"com.example.BarTest","connectsToQueue","ERROR","He said ""hi"" <b>"
"com.example.BarTest","sendsMessage","SKIPPED","queue manager unavailable"
"com.example.BarTest","readsConfig","PASSED",""
"com.example.FooTest","addsNumbers","PASSED",""
"com.example.FooTest","dividesByZero","FAILED","boom"
"com.example.FooTest","subtractsNumbers","PASSED",""
"#;

#[test]
fn aggregate_a_report_directory() -> Result<()> {
    let out = tempfile::tempdir()?;
    let csv = out.path().join("results.csv");
    let html = out.path().join("results.html");

    let mut cmd = Command::cargo_bin("junit-report")?;
    cmd.args(["--repo-type", "public", "--csv"])
        .arg(&csv)
        .arg("--html")
        .arg(&html)
        .arg("./test/reports")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "com.example.FooTest: Tests: 3, Passed: 2, Failed: 1, Errors: 0, Skipped: 0",
        ))
        .stdout(predicate::str::contains(
            "com.example.BarTest: Tests: 3, Passed: 1, Failed: 0, Errors: 1, Skipped: 1",
        ))
        .stdout(predicate::str::contains(
            "Total: 6, Passed: 3, Failed: 1, Errors: 1, Skipped: 1",
        ));

    assert_eq!(fs::read_to_string(&csv)?, EXPECTED_CSV);

    let html = fs::read_to_string(&html)?;
    assert!(html.contains("<strong>public</strong>"));
    assert!(html.contains("He said \"hi\" &lt;b&gt;"));
    assert!(html.contains("id=\"total-count\">6</span>"));
    assert!(html.contains("id=\"passed-count\">3</span>"));
    assert_eq!(html.matches("<tr class=").count(), 6);
    Ok(())
}

#[test]
fn rerun_produces_identical_csv() -> Result<()> {
    let out = tempfile::tempdir()?;
    let csv = out.path().join("results.csv");
    let html = out.path().join("results.html");

    let mut runs = vec![];
    for _ in 0..2 {
        Command::cargo_bin("junit-report")?
            .arg("--csv")
            .arg(&csv)
            .arg("--html")
            .arg(&html)
            .arg("./test/reports")
            .assert()
            .success();
        runs.push(fs::read(&csv)?);
    }
    assert_eq!(runs[0], runs[1]);
    Ok(())
}

#[test]
fn empty_directory_yields_empty_reports() -> Result<()> {
    let reports = tempfile::tempdir()?;
    let out = tempfile::tempdir()?;
    let csv = out.path().join("results.csv");
    let html = out.path().join("results.html");

    Command::cargo_bin("junit-report")?
        .arg("--csv")
        .arg(&csv)
        .arg("--html")
        .arg(&html)
        .arg(reports.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No test reports found"))
        .stdout(predicate::str::contains(
            "Total: 0, Passed: 0, Failed: 0, Errors: 0, Skipped: 0",
        ));

    assert_eq!(
        fs::read_to_string(&csv)?,
        "Test Class,Test Method,Result,Failure Reason\n"
    );
    let html = fs::read_to_string(&html)?;
    assert!(html.contains("<tbody>\n</tbody>"));
    for id in ["total", "passed", "failed", "errors", "skipped"] {
        assert!(html.contains(&format!("id=\"{id}-count\">0</span>")));
    }
    Ok(())
}

#[test]
fn missing_directory_is_not_fatal() -> Result<()> {
    let out = tempfile::tempdir()?;

    Command::cargo_bin("junit-report")?
        .arg("--csv")
        .arg(out.path().join("results.csv"))
        .arg("--html")
        .arg(out.path().join("results.html"))
        .arg(out.path().join("no-such-dir"))
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn report_path_that_is_a_file_is_not_fatal() -> Result<()> {
    let out = tempfile::tempdir()?;
    let reports = out.path().join("surefire-reports");
    fs::write(&reports, "a file, not a directory")?;
    let csv = out.path().join("results.csv");

    Command::cargo_bin("junit-report")?
        .arg("--csv")
        .arg(&csv)
        .arg("--html")
        .arg(out.path().join("results.html"))
        .arg(&reports)
        .assert()
        .success()
        .stderr(predicate::str::contains("Unable to list report directory"))
        .stdout(predicate::str::contains(
            "Total: 0, Passed: 0, Failed: 0, Errors: 0, Skipped: 0",
        ));

    assert_eq!(
        fs::read_to_string(&csv)?,
        "Test Class,Test Method,Result,Failure Reason\n"
    );
    Ok(())
}

#[test]
fn unwritable_output_fails() -> Result<()> {
    let out = tempfile::tempdir()?;
    let blocker = out.path().join("blocker");
    fs::write(&blocker, "a file, not a directory")?;

    Command::cargo_bin("junit-report")?
        .arg("--csv")
        .arg(blocker.join("results.csv"))
        .arg("--html")
        .arg(out.path().join("results.html"))
        .arg("./test/reports")
        .assert()
        .failure()
        .stderr(predicate::str::contains("blocker"));
    Ok(())
}

#[test]
fn strict_mode_fails_on_failures() -> Result<()> {
    let out = tempfile::tempdir()?;
    let csv = out.path().join("results.csv");

    Command::cargo_bin("junit-report")?
        .arg("--strict")
        .arg("--csv")
        .arg(&csv)
        .arg("--html")
        .arg(out.path().join("results.html"))
        .arg("./test/reports")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 failures and 1 errors"));

    assert_eq!(fs::read_to_string(&csv)?, EXPECTED_CSV);
    Ok(())
}

#[test]
#[ignore = "needs node on PATH; run with `cargo test -- --include-ignored`"]
fn client_script_functions() -> Result<()> {
    let output = process::Command::new("node")
        .arg("test/js/report_test.js")
        .output()?;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}
