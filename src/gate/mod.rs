//! Pass/fail gate
//!
//! A pure function of (report, policy). Conditions are checked in order and
//! the first failure decides the message: test failures take precedence
//! over coverage, since coverage of a broken module means little.

use cca_target::CoverageTarget;
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Details used when every gate passes
pub const PASSED_DETAILS: &str = "all gates passed";

/// Caller-supplied gate policy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GatePolicy {
    /// Fail when any test failed or errored
    pub fail_on_tests: bool,

    /// Minimum overall coverage, inclusive
    pub coverage_target: Option<CoverageTarget>,
}

/// Final decision; the process exit status is derived from `ok`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ok: bool,
    pub details: String,
}

impl Outcome {
    pub fn passed() -> Self {
        Self {
            ok: true,
            details: PASSED_DETAILS.to_string(),
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            ok: false,
            details: details.into(),
        }
    }
}

/// Evaluate `policy` against `report`.
pub fn evaluate(report: &Report, policy: &GatePolicy) -> Outcome {
    let counts = &report.counts;
    if policy.fail_on_tests && counts.has_failures() {
        return Outcome::failed(format!(
            "tests failed: {} failed, {} errored",
            counts.failed, counts.errored
        ));
    }

    if let Some(target) = policy.coverage_target {
        match report.coverage.overall {
            None => {
                return Outcome::failed(format!(
                    "coverage could not be measured (target {})",
                    target
                ));
            }
            Some(actual) if !target.is_met_by(actual) => {
                return Outcome::failed(format!(
                    "coverage {}% is below target {}",
                    format_measured(actual, target),
                    target
                ));
            }
            Some(_) => {}
        }
    }

    Outcome::passed()
}

/// Two decimals, unless rounding would lift a shortfall to the target.
fn format_measured(actual: f64, target: CoverageTarget) -> String {
    let shown = format!("{:.2}", actual);
    match shown.parse::<f64>() {
        Ok(rounded) if target.is_met_by(rounded) => actual.to_string(),
        _ => shown,
    }
}
