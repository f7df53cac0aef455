//! End-to-end report runs: run, build, gate, write
//!
//! Canned runners replay captured output; on unix a `sh` stand-in exercises
//! the real subprocess path.

mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use cca_gate::gate::{evaluate, GatePolicy};
use cca_gate::report::ReportArtifact;
use cca_gate::{
    generate_report, parse_coverage_target, CannedRunner, ExitCode, Pipeline, PipelineError, ReportRequest,
};
use chrono::{TimeZone, Utc};
use fixtures::load_output;
use tempfile::TempDir;

fn request(repo: &Path, module: Option<&str>) -> ReportRequest {
    ReportRequest {
        repo: repo.to_path_buf(),
        module_path: module.map(str::to_string),
        report_out_path: PathBuf::from("reports/test_report.json"),
        report_md_path: Some(PathBuf::from("reports/test_report.md")),
        fail_on_tests: false,
        fail_on_coverage: None,
    }
}

fn canned(exit_code: i32, fixture: &str) -> CannedRunner {
    CannedRunner::new(exit_code, load_output(fixture))
}

#[test]
fn test_coverage_just_below_target_fails() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/parser.py"));
    req.fail_on_coverage = Some("80%".to_string());

    let outcome = generate_report(&canned(0, "below_threshold.txt"), &req).unwrap();

    assert!(!outcome.ok);
    assert!(outcome.details.contains("80"), "{}", outcome.details);
    assert!(outcome.details.contains("79.99"), "{}", outcome.details);
}

#[test]
fn test_coverage_exactly_at_target_passes() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/parser.py"));
    req.fail_on_coverage = Some("80%".to_string());

    let outcome = generate_report(&canned(0, "exact_threshold.txt"), &req).unwrap();

    assert!(outcome.ok, "{}", outcome.details);
}

#[test]
fn test_shortfall_that_rounds_to_target_fails() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/ledger.py"));
    req.fail_on_coverage = Some("80%".to_string());

    let output = Pipeline::new(&canned(0, "rounding_shortfall.txt")).run(&req).unwrap();

    assert!(!output.outcome.ok, "{}", output.outcome.details);
    assert!(output.outcome.details.contains("79.996"), "{}", output.outcome.details);
    assert_eq!(output.artifact.coverage.overall, Some(79.996));

    // Two decimals on disk, the failing gate alongside
    let json = fs::read_to_string(&output.written.json_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["coverage"]["overall"], 80.0);
    assert_eq!(value["gate"]["ok"], false);
}

#[test]
fn test_zero_tests_collected_without_target_passes() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), None);

    let output = Pipeline::new(&canned(5, "no_tests_ran.txt")).run(&req).unwrap();

    assert!(output.outcome.ok);
    assert_eq!(output.exit_code(), ExitCode::Success);
    assert_eq!(output.tool_exit_code, 5);
    assert_eq!(output.artifact.counts.total(), 0);
    assert_eq!(output.artifact.coverage.overall, None);
    assert!(output.artifact.coverage.files.is_empty());

    let json = fs::read_to_string(dir.path().join("reports/test_report.json")).unwrap();
    assert!(json.contains(r#""overall": null"#));
}

#[test]
fn test_failed_test_with_fail_on_tests() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/calculator.py"));
    req.fail_on_tests = true;

    let output = Pipeline::new(&canned(1, "full_run.txt")).run(&req).unwrap();

    assert!(!output.outcome.ok);
    assert_eq!(output.exit_code(), ExitCode::GateFailed);
    assert!(output.outcome.details.contains("1 failed"), "{}", output.outcome.details);

    // The report is still written, gate included
    let loaded = ReportArtifact::from_json(&fs::read_to_string(&output.written.json_path).unwrap()).unwrap();
    assert!(!loaded.gate.ok);
    assert_eq!(loaded.counts.failed, 1);
}

#[test]
fn test_failed_test_without_fail_on_tests_passes() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));

    let outcome = generate_report(&canned(1, "full_run.txt"), &req).unwrap();

    assert!(outcome.ok);
}

#[test]
fn test_test_failure_takes_precedence_over_coverage() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/calculator.py"));
    req.fail_on_tests = true;
    req.fail_on_coverage = Some("99%".to_string());

    let outcome = generate_report(&canned(1, "full_run.txt"), &req).unwrap();

    assert!(!outcome.ok);
    assert!(outcome.details.starts_with("tests failed"), "{}", outcome.details);
    assert!(!outcome.details.contains("coverage"));
}

#[test]
fn test_target_set_but_coverage_unmeasured_fails() {
    let dir = TempDir::new().unwrap();
    let mut req = request(dir.path(), Some("src/misc.py"));
    req.fail_on_coverage = Some("50".to_string());

    let outcome = generate_report(&canned(0, "no_data.txt"), &req).unwrap();

    assert!(!outcome.ok);
    assert!(outcome.details.contains("could not be measured"));
}

#[test]
fn test_gate_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));
    let output = Pipeline::new(&canned(1, "full_run.txt")).run(&req).unwrap();
    let report = output.artifact.report();

    let policy = GatePolicy {
        fail_on_tests: true,
        coverage_target: Some(parse_coverage_target("90%").unwrap()),
    };
    let first = evaluate(&report, &policy);
    for _ in 0..10 {
        assert_eq!(evaluate(&report, &policy), first);
    }
}

#[test]
fn test_rewrite_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));
    let ts = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
    let runner = canned(1, "full_run.txt");
    let json_path = dir.path().join("reports/test_report.json");
    let md_path = dir.path().join("reports/test_report.md");

    Pipeline::new(&runner).with_timestamp(ts).run(&req).unwrap();
    let first_json = fs::read(&json_path).unwrap();
    let first_md = fs::read(&md_path).unwrap();

    Pipeline::new(&runner).with_timestamp(ts).run(&req).unwrap();
    assert_eq!(fs::read(&json_path).unwrap(), first_json);
    assert_eq!(fs::read(&md_path).unwrap(), first_md);
    assert_eq!(runner.calls(), 2);
}

#[test]
fn test_fingerprint_stable_across_timestamps() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));
    let runner = canned(1, "full_run.txt");

    let a = Pipeline::new(&runner)
        .with_timestamp(Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap())
        .run(&req)
        .unwrap();
    let b = Pipeline::new(&runner)
        .with_timestamp(Utc.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).unwrap())
        .run(&req)
        .unwrap();

    assert_eq!(a.written.fingerprint, b.written.fingerprint);
}

#[test]
fn test_report_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("pkg/shapes.py"));

    let output = Pipeline::new(&canned(0, "branch_coverage.txt")).run(&req).unwrap();

    let loaded = ReportArtifact::from_json(&fs::read_to_string(&output.written.json_path).unwrap()).unwrap();
    assert_eq!(loaded, output.artifact);
    assert_eq!(loaded.report(), output.artifact.report());
    assert_eq!(loaded.coverage.files[0].missing, vec!["17", "25->27", "40->exit"]);

    let md = fs::read_to_string(dir.path().join("reports/test_report.md")).unwrap();
    assert!(md.contains("| Overall coverage | 91.00% |"));
    assert!(md.contains("| pkg/shapes.py | 88.00% | 17, 25->27, 40->exit |"));
}

#[test]
fn test_invalid_target_is_rejected_before_running() {
    let dir = TempDir::new().unwrap();
    let runner = canned(0, "all_passed.txt");

    for bad in ["", "abc", "101", "-1", "80%%"] {
        let mut req = request(dir.path(), None);
        req.fail_on_coverage = Some(bad.to_string());

        let err = generate_report(&runner, &req).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)), "{:?}", bad);
        assert_eq!(err.exit_code().as_i32(), 2);
    }

    assert_eq!(runner.calls(), 0);
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_write_failure_keeps_previous_report() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));
    Pipeline::new(&canned(0, "all_passed.txt")).run(&req).unwrap();
    let previous = fs::read(dir.path().join("reports/test_report.json")).unwrap();

    // JSON destination lies under a regular file
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let mut bad = req.clone();
    bad.report_out_path = blocker.join("test_report.json");

    let err = Pipeline::new(&canned(1, "full_run.txt")).run(&bad).unwrap_err();

    assert!(matches!(err, PipelineError::Write(_)));
    assert_eq!(err.exit_code(), ExitCode::ReportWrite);
    assert_eq!(fs::read(dir.path().join("reports/test_report.json")).unwrap(), previous);
}

#[test]
fn test_markdown_failure_keeps_previous_json() {
    let dir = TempDir::new().unwrap();
    let req = request(dir.path(), Some("src/calculator.py"));
    Pipeline::new(&canned(0, "all_passed.txt")).run(&req).unwrap();
    let json_path = dir.path().join("reports/test_report.json");
    let previous = fs::read(&json_path).unwrap();

    let md_dir = dir.path().join("reports/md_is_a_dir");
    fs::create_dir_all(md_dir.join("inner")).unwrap();
    let mut bad = req.clone();
    bad.fail_on_tests = true;
    bad.report_md_path = Some(md_dir);

    let err = Pipeline::new(&canned(1, "full_run.txt")).run(&bad).unwrap_err();

    assert_eq!(err.exit_code(), ExitCode::ReportWrite);
    assert_eq!(fs::read(&json_path).unwrap(), previous);
    let loaded = ReportArtifact::from_json(&String::from_utf8(previous).unwrap()).unwrap();
    assert!(loaded.gate.ok);
}

#[cfg(unix)]
mod subprocess {
    use super::*;
    use cca_gate::runner::{RunnerConfig, TestRunner};
    use cca_gate::ExecutionError;

    /// A runner that prints a fixture and exits with `exit_code`.
    fn replay(fixture: &str, exit_code: i32) -> TestRunner {
        TestRunner::new(RunnerConfig {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                format!("cat \"$0\"; exit {}", exit_code),
                fixtures::output_path(fixture).to_string_lossy().to_string(),
            ],
            ..RunnerConfig::default()
        })
    }

    #[test]
    fn test_end_to_end_failing_run() {
        let dir = TempDir::new().unwrap();
        let mut req = request(dir.path(), Some("src/calculator.py"));
        req.fail_on_tests = true;

        let output = Pipeline::new(&replay("full_run.txt", 1)).run(&req).unwrap();

        assert_eq!(output.tool_exit_code, 1);
        assert_eq!(output.exit_code(), ExitCode::GateFailed);
        assert_eq!(output.artifact.counts.passed, 4);
        assert_eq!(output.artifact.coverage.overall, Some(93.0));
        assert_eq!(output.artifact.coverage.files[0].percent, Some(85.0));
        assert!(dir.path().join("reports/test_report.md").exists());
    }

    #[test]
    fn test_end_to_end_passing_run() {
        let dir = TempDir::new().unwrap();
        let mut req = request(dir.path(), Some("app.py"));
        req.fail_on_tests = true;
        req.fail_on_coverage = Some("75%".to_string());

        let outcome = generate_report(&replay("single_file.txt", 0), &req).unwrap();

        assert!(outcome.ok, "{}", outcome.details);
    }

    #[test]
    fn test_missing_program_is_execution_error() {
        let dir = TempDir::new().unwrap();
        let runner = TestRunner::new(RunnerConfig {
            program: "cca-definitely-not-installed".to_string(),
            ..RunnerConfig::default()
        });

        let err = generate_report(&runner, &request(dir.path(), None)).unwrap_err();

        assert!(matches!(err, PipelineError::Execution(ExecutionError::Spawn { .. })));
        assert_eq!(err.exit_code().as_i32(), 3);
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn test_killed_tool_writes_no_report() {
        let dir = TempDir::new().unwrap();
        let runner = TestRunner::new(RunnerConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "kill -9 $$".to_string()],
            ..RunnerConfig::default()
        });

        let err = generate_report(&runner, &request(dir.path(), None)).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Execution(ExecutionError::Terminated { signal: Some(9) })
        ));
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn test_missing_repo_dir_is_execution_error() {
        let dir = TempDir::new().unwrap();
        let req = request(&dir.path().join("gone"), None);

        let err = generate_report(&replay("all_passed.txt", 0), &req).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Execution(ExecutionError::WorkingDirMissing(_))
        ));
    }
}
