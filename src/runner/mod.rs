//! Test execution
//!
//! Runs the external test tool as a blocking subprocess and captures its
//! output. A nonzero exit caused by failing tests is a normal result; only
//! a tool that cannot be started, or that is killed, is an error.

mod canned;

pub use canned::CannedRunner;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::RunnerSettings;

/// Errors that abort the pipeline before any report is written
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("working directory does not exist: {}", .0.display())]
    WorkingDirMissing(PathBuf),

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("test tool was terminated{}", signal_suffix(.signal))]
    Terminated { signal: Option<i32> },
}

fn signal_suffix(signal: &Option<i32>) -> String {
    match signal {
        Some(sig) => format!(" by signal {}", sig),
        None => String::new(),
    }
}

/// Raw result of one tool invocation. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRunResult {
    /// Tool exit status
    pub exit_code: i32,

    /// Wall-clock duration
    pub duration: Duration,

    pub stdout: String,
    pub stderr: String,

    /// Module scope the run was restricted to
    pub module: Option<String>,
}

impl TestRunResult {
    /// stdout followed by stderr, the text the report is built from
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(&self.stdout);
        if !self.stdout.is_empty() && !self.stdout.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }
}

/// Something that can execute the tests of a working directory
pub trait Runner {
    fn run(&self, work_dir: &Path, module: Option<&str>) -> Result<TestRunResult, ExecutionError>;
}

/// Launch configuration for [`TestRunner`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub program: String,
    pub args: Vec<String>,
    pub cov_report: String,
    pub extra_args: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "pytest".to_string()],
            cov_report: "term-missing".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl From<&RunnerSettings> for RunnerConfig {
    fn from(settings: &RunnerSettings) -> Self {
        Self {
            program: settings.program.clone(),
            args: settings.args.clone(),
            cov_report: settings.cov_report.clone(),
            extra_args: settings.extra_args.clone(),
        }
    }
}

/// Runs the configured test tool as a subprocess
#[derive(Debug, Clone)]
pub struct TestRunner {
    config: RunnerConfig,
}

impl TestRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Arguments passed to the program (program itself excluded).
    ///
    /// Coverage is measured over the module's parent directory when a
    /// module is given, otherwise over the whole working directory.
    pub fn arguments(&self, module: Option<&str>) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push(format!("--cov={}", coverage_source(module)));
        args.push(format!("--cov-report={}", self.config.cov_report));
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

impl Runner for TestRunner {
    fn run(&self, work_dir: &Path, module: Option<&str>) -> Result<TestRunResult, ExecutionError> {
        if !work_dir.is_dir() {
            return Err(ExecutionError::WorkingDirMissing(work_dir.to_path_buf()));
        }

        let args = self.arguments(module);
        tracing::info!(
            program = %self.config.program,
            args = ?args,
            cwd = %work_dir.display(),
            "running tests"
        );

        let start = Instant::now();
        let output = Command::new(&self.config.program)
            .args(&args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecutionError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        let duration = start.elapsed();

        let exit_code = exit_code_of(&output.status)?;
        tracing::info!(exit_code, duration_ms = duration.as_millis() as u64, "test tool finished");

        Ok(TestRunResult {
            exit_code,
            duration,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            module: module.map(str::to_string),
        })
    }
}

/// Directory handed to `--cov`
pub fn coverage_source(module: Option<&str>) -> String {
    module
        .map(Path::new)
        .and_then(Path::parent)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string())
}

/// A status without a code means the process was killed.
fn exit_code_of(status: &ExitStatus) -> Result<i32, ExecutionError> {
    if let Some(code) = status.code() {
        return Ok(code);
    }

    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal = None;

    Err(ExecutionError::Terminated { signal })
}
