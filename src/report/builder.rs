//! Builds a [`Report`] from captured tool output

use cca_pytest::{normalize_path, parse_output, ParsedOutput, OUTPUT_CONTRACT};
use chrono::{DateTime, Utc};

use super::model::{CoverageSummary, FileCoverage, Report, TestCounts};
use crate::runner::TestRunResult;

/// pytest exit status for "no tests collected"
const EXIT_NO_TESTS_COLLECTED: i32 = 5;

/// Turns a [`TestRunResult`] into a [`Report`].
///
/// Never fails: output that cannot be read becomes zero counts and absent
/// coverage.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    timestamp: Option<DateTime<Utc>>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the generation timestamp instead of using the current time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(&self, run: &TestRunResult) -> Report {
        let parsed = parse_output(&run.combined_output());
        self.check_contract(run, &parsed);

        let counts: TestCounts = parsed.counts.map(Into::into).unwrap_or_default();
        let coverage = coverage_summary(&parsed, run.module.as_deref());

        tracing::debug!(
            passed = counts.passed,
            failed = counts.failed,
            errored = counts.errored,
            skipped = counts.skipped,
            overall = ?coverage.overall,
            "built report"
        );

        Report::new(self.timestamp.unwrap_or_else(Utc::now), counts, coverage)
    }

    fn check_contract(&self, run: &TestRunResult, parsed: &ParsedOutput) {
        if parsed.counts.is_none() && !run.combined_output().trim().is_empty() {
            tracing::warn!(contract = OUTPUT_CONTRACT, "no result line found in test output");
        }
        if parsed.collected_mismatch() {
            tracing::warn!(
                collected = ?parsed.collected,
                counted = parsed.counts.map(|c| c.total()),
                "collected count differs from result counts"
            );
        }
        if parsed.coverage.is_none() {
            tracing::warn!(contract = OUTPUT_CONTRACT, "no coverage table found in test output");
        }
        let failures_reported = parsed
            .counts
            .map(|c| c.failed > 0 || c.errored > 0)
            .unwrap_or(false);
        if run.exit_code != 0 && run.exit_code != EXIT_NO_TESTS_COLLECTED && !failures_reported {
            tracing::warn!(
                exit_code = run.exit_code,
                "test tool exited nonzero without reporting failures"
            );
        }
    }
}

fn coverage_summary(parsed: &ParsedOutput, module: Option<&str>) -> CoverageSummary {
    let table = parsed.coverage.as_ref();
    let overall = table.and_then(|t| t.overall());

    let files = match module {
        Some(module) => {
            let row = table.and_then(|t| t.find(module));
            if row.is_none() {
                tracing::warn!(module = %module, "no coverage entry for requested module");
            }
            vec![FileCoverage {
                path: normalize_path(module),
                percent: row.and_then(|r| r.percent),
                missing: row.map(|r| r.missing.clone()).unwrap_or_default(),
            }]
        }
        None => Vec::new(),
    };

    CoverageSummary { overall, files }
}
