//! Typed view of the merged configuration

use cca_target::{parse_coverage_target, CoverageTarget, ValidationError};
use serde::{Deserialize, Serialize};

/// How the external test tool is launched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerSettings {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    pub cov_report: String,

    /// Appended after the coverage flags
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// Where artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub out: String,

    #[serde(default)]
    pub md: Option<String>,
}

/// A coverage threshold as written in config: `"80%"` or `80`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdSetting {
    Number(f64),
    Text(String),
}

impl ThresholdSetting {
    /// Parse into a validated target
    pub fn parse(&self) -> Result<CoverageTarget, ValidationError> {
        match self {
            ThresholdSetting::Number(n) => CoverageTarget::new(*n),
            ThresholdSetting::Text(s) => parse_coverage_target(s),
        }
    }

    /// The expression as the coverage parser sees it
    pub fn as_expression(&self) -> String {
        match self {
            ThresholdSetting::Number(n) => n.to_string(),
            ThresholdSetting::Text(s) => s.clone(),
        }
    }
}

/// Gate policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSettings {
    #[serde(default)]
    pub fail_on_tests: bool,

    #[serde(default)]
    pub fail_on_coverage: Option<ThresholdSetting>,
}

/// All settings after merging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub runner: RunnerSettings,
    pub report: ReportSettings,
    pub gate: GateSettings,
}

impl Settings {
    /// Check values that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), String> {
        if self.runner.program.trim().is_empty() {
            return Err("runner.program must not be empty".to_string());
        }
        if self.runner.cov_report.trim().is_empty() {
            return Err("runner.cov_report must not be empty".to_string());
        }
        if self.report.out.trim().is_empty() {
            return Err("report.out must not be empty".to_string());
        }
        if let Some(md) = &self.report.md {
            if md.trim().is_empty() {
                return Err("report.md must not be empty when set".to_string());
            }
            if md.trim() == self.report.out.trim() {
                return Err("report.md and report.out must differ".to_string());
            }
        }
        if let Some(threshold) = &self.gate.fail_on_coverage {
            threshold
                .parse()
                .map_err(|e| format!("gate.fail_on_coverage: {}", e))?;
        }
        Ok(())
    }
}
