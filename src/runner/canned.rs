//! Runner that replays a fixed result, for tests and dry runs

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use super::{ExecutionError, Runner, TestRunResult};

/// Returns the same output on every call and counts invocations.
#[derive(Debug, Default)]
pub struct CannedRunner {
    exit_code: i32,
    stdout: String,
    fail_to_start: bool,
    calls: Cell<usize>,
}

impl CannedRunner {
    pub fn new(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            fail_to_start: false,
            calls: Cell::new(0),
        }
    }

    /// A runner whose tool cannot be launched
    pub fn unstartable() -> Self {
        Self {
            fail_to_start: true,
            ..Self::default()
        }
    }

    /// Number of times `run` was called
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Runner for CannedRunner {
    fn run(&self, _work_dir: &Path, module: Option<&str>) -> Result<TestRunResult, ExecutionError> {
        self.calls.set(self.calls.get() + 1);

        if self.fail_to_start {
            return Err(ExecutionError::Spawn {
                program: "canned".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such tool"),
            });
        }

        Ok(TestRunResult {
            exit_code: self.exit_code,
            duration: Duration::ZERO,
            stdout: self.stdout.clone(),
            stderr: String::new(),
            module: module.map(str::to_string),
        })
    }
}
