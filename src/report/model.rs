//! Report data model

use cca_pytest::ResultCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Schema version for test_report.json
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for test_report.json
pub const REPORT_SCHEMA_ID: &str = "cca/test_report@1";

/// Test outcome counts. Unsigned, so never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCounts {
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
    pub skipped: u32,
}

impl TestCounts {
    /// Number of test cases the counts account for
    pub fn total(&self) -> u32 {
        self.passed
            .saturating_add(self.failed)
            .saturating_add(self.errored)
            .saturating_add(self.skipped)
    }

    /// True when anything failed or errored
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }
}

impl From<ResultCounts> for TestCounts {
    fn from(c: ResultCounts) -> Self {
        Self {
            passed: c.passed,
            failed: c.failed,
            errored: c.errored,
            skipped: c.skipped,
        }
    }
}

/// Coverage of one requested file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub path: String,

    /// `None` means no data, which is not the same as 0%
    #[serde(serialize_with = "serialize_percent")]
    pub percent: Option<f64>,

    /// Missing line ranges as printed by the tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

/// Coverage figures of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// As measured; rounded only when serialized. `None` when no coverage
    /// instrumentation output was available
    #[serde(serialize_with = "serialize_percent")]
    pub overall: Option<f64>,

    /// Per-file entries; only populated when a module scope was requested
    pub files: Vec<FileCoverage>,
}

/// Structured summary of one test-and-coverage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: u32,
    pub schema_id: String,
    pub timestamp: DateTime<Utc>,
    pub counts: TestCounts,
    pub coverage: CoverageSummary,
}

impl Report {
    pub fn new(timestamp: DateTime<Utc>, counts: TestCounts, coverage: CoverageSummary) -> Self {
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            schema_id: REPORT_SCHEMA_ID.to_string(),
            timestamp,
            counts,
            coverage,
        }
    }
}

/// Round a percentage to two decimal places
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn serialize_percent<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    value.map(round_percent).serialize(serializer)
}
