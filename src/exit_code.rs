//! Stable process exit codes

use serde::{Deserialize, Serialize};

use crate::gate::Outcome;

/// Exit codes of the `cca` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ExitCode {
    /// Report written and every gate passed
    Success = 0,
    /// Report written but a gate failed
    GateFailed = 1,
    /// Malformed coverage target or configuration; nothing was run
    Validation = 2,
    /// The test tool could not be started or was killed; no report
    Execution = 3,
    /// The report could not be written
    ReportWrite = 4,
}

impl ExitCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Exit code for a completed pipeline
    pub fn from_outcome(outcome: &Outcome) -> Self {
        if outcome.ok {
            ExitCode::Success
        } else {
            ExitCode::GateFailed
        }
    }
}
