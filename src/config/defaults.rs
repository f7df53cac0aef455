//! Built-in defaults (layer 1)

use serde_json::{json, Value};

/// Default values for every setting
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Test tool executable
    pub program: String,

    /// Arguments placed before the coverage flags
    pub args: Vec<String>,

    /// Value passed to `--cov-report`
    pub cov_report: String,

    /// JSON report path, relative to the repo
    pub report_out: String,

    /// Fail when any test fails or errors
    pub fail_on_tests: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "pytest".to_string()],
            cov_report: "term-missing".to_string(),
            report_out: "reports/test_report.json".to_string(),
            fail_on_tests: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a JSON layer for merging
    pub fn to_value(&self) -> Value {
        json!({
            "runner": {
                "program": self.program,
                "args": self.args,
                "cov_report": self.cov_report,
                "extra_args": [],
            },
            "report": {
                "out": self.report_out,
                "md": null,
            },
            "gate": {
                "fail_on_tests": self.fail_on_tests,
                "fail_on_coverage": null,
            },
        })
    }
}
